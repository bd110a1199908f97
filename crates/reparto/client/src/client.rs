//! HTTP client for assignment listing and status submission

use crate::error::{ClientError, ClientResult};
use crate::token::TokenProvider;
use reparto_types::{
    DeliveryId, DeliveryStatus, ImageAttachment, LegType, RawAssignment, TransitionEvidence,
};
use reqwest::{multipart, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// Body of a status-change PATCH
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    /// Numeric status id
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Paid amount, minor units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<u32>,
}

impl StatusChangeRequest {
    /// Build the request body for a target status from validated evidence
    pub fn from_evidence(target: DeliveryStatus, evidence: &TransitionEvidence) -> Self {
        Self {
            status: target.wire_id(),
            note: evidence.note.clone(),
            amount_paid: evidence.amount_paid_minor,
            payment_method_id: evidence.payment_method.as_ref().map(|m| m.id),
        }
    }
}

/// HTTP client for the courier assignment API
pub struct AssignmentClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl AssignmentClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// List this courier's current assignments
    pub async fn list_assignments(&self) -> ClientResult<Vec<RawAssignment>> {
        let token = self.require_token().await?;
        let url = format!("{}/api/v1/assignments", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        self.handle_response(response).await
    }

    /// Submit a validated status transition, choosing the JSON or multipart
    /// route depending on whether evidence images are attached.
    ///
    /// Validation runs first and never reaches the network on failure. On a
    /// server rejection the caller must roll back any optimistic edit by
    /// refreshing, not by trusting the local patch.
    pub async fn submit_transition(
        &self,
        id: &DeliveryId,
        target: DeliveryStatus,
        leg: LegType,
        evidence: &TransitionEvidence,
    ) -> ClientResult<RawAssignment> {
        evidence.validate(target, leg)?;

        let request = StatusChangeRequest::from_evidence(target, evidence);
        let images = evidence.images();
        if images.is_empty() {
            self.update_status(id, &request).await
        } else {
            self.submit_with_evidence(id, &request, &images).await
        }
    }

    /// PATCH a status change without evidence images
    pub async fn update_status(
        &self,
        id: &DeliveryId,
        request: &StatusChangeRequest,
    ) -> ClientResult<RawAssignment> {
        let token = self.require_token().await?;
        let url = format!("{}/api/v1/assignments/{}/status", self.base_url, id);
        tracing::debug!(id = %id, status = request.status, "Submitting status change");

        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// PATCH a status change carrying one or more image parts under the
    /// `images` field (camera photo and gallery image are distinct slots)
    pub async fn submit_with_evidence(
        &self,
        id: &DeliveryId,
        request: &StatusChangeRequest,
        images: &[&ImageAttachment],
    ) -> ClientResult<RawAssignment> {
        let token = self.require_token().await?;
        let url = format!("{}/api/v1/assignments/{}/status", self.base_url, id);
        tracing::debug!(id = %id, status = request.status, images = images.len(), "Submitting status change with evidence");

        let mut form = multipart::Form::new().text("status", request.status.to_string());
        if let Some(note) = &request.note {
            form = form.text("note", note.clone());
        }
        if let Some(amount) = request.amount_paid {
            form = form.text("amountPaid", amount.to_string());
        }
        if let Some(method_id) = request.payment_method_id {
            form = form.text("paymentMethodId", method_id.to_string());
        }
        for image in images {
            let part = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }

        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Fetch the token, short-circuiting before any I/O when logged out
    async fn require_token(&self) -> ClientResult<String> {
        self.tokens
            .bearer_token()
            .await
            .ok_or_else(|| ClientError::Unauthorized("no session token".to_string()))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::Unauthorized(message))
        } else if status == StatusCode::NOT_FOUND {
            Err(ClientError::NotFound("Assignment not found".into()))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

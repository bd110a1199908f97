//! Bearer token injection seam
//!
//! Token storage and refresh belong to the authentication collaborator;
//! the client only asks for the current token right before each request.

use async_trait::async_trait;

/// Source of the current bearer token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, or None when the courier is logged out
    async fn bearer_token(&self) -> Option<String>;
}

/// Fixed-token provider for tests and scripted sessions
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider with no token, behaving like a logged-out session
    pub fn logged_out() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("tok-123");
        assert_eq!(provider.bearer_token().await.as_deref(), Some("tok-123"));

        let logged_out = StaticTokenProvider::logged_out();
        assert!(logged_out.bearer_token().await.is_none());
    }
}

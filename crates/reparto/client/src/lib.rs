//! REST client for the Reparto backend
//!
//! Lists the courier's assignments and submits status changes, attaching
//! photo evidence and payment metadata where the transition demands it.
//! Evidence rules are validated locally before any network call; the bearer
//! token comes from an injected provider so authentication stays a
//! collaborator, not an ambient global.

pub mod client;
pub mod error;
pub mod token;

pub use client::{AssignmentClient, ClientConfig, StatusChangeRequest};
pub use error::{ClientError, ClientResult};
pub use token::{StaticTokenProvider, TokenProvider};

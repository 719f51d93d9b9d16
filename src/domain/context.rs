//! Operation Context
//!
//! Who asked and from where, stamped onto every request by the API layer
//! and recorded on its log span.

use std::net::IpAddr;
use uuid::Uuid;

/// Per-request metadata, carried as a request extension.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Caller named by the x-user-id header
    pub request_user_id: Option<String>,

    /// Correlation ID echoed back to the caller
    pub correlation_id: Option<Uuid>,

    /// Peer address, when the server was started with connect info
    pub client_ip: Option<IpAddr>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_user(mut self, user_id: impl Into<String>) -> Self {
        self.request_user_id = Some(user_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Correlation ID of this request, minted on first use
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

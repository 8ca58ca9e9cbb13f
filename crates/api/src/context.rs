use uuid::Uuid;

/// Per-request context inserted by the request middleware.
///
/// Present on every routed request; handlers use it to correlate logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Uuid,
}

impl RequestContext {
    pub fn new() -> Self {
        Self { request_id: Uuid::now_v7() }
    }

    pub fn from_request_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

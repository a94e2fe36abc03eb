mod client;
mod dispatcher;
mod endpoints;
mod extract;
mod retry;

pub use client::build_http_client;
pub use dispatcher::{Dispatcher, GenerationRequest, GenerationResult, ModelCandidates};
pub use endpoints::{ModelEndpoints, PreparedRequest};
pub use extract::extract_text;
pub use retry::{GrowthBackoff, RawResponse, RetryPolicy, send_with_retry};

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

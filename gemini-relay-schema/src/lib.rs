pub mod gemini;
pub mod relay;

pub use gemini::{Content, GenerateContentRequest, Part};
pub use relay::{GenerateBody, GenerateReply, HealthReply};

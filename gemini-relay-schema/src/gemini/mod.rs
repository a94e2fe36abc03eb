mod generate_content_request;

pub use generate_content_request::{Content, GenerateContentRequest, Part};

pub mod client;
pub mod stream;

pub use client::{select_model, GenerateRequest, LlmError, OllamaClient};
pub use stream::FragmentStream;

//! Backend module - provider adapters, registry and the chat assistant

pub mod client;
pub mod gemini;
pub mod openai;
pub mod registry;
pub mod stability;
pub mod text_backend;
pub mod traits;

pub use registry::{resolve, ProviderRegistry, ProviderStatus, RESOLUTION_ORDER};
pub use text_backend::{
    create_text_backend, ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    TextBackend,
};
pub use traits::{
    Capabilities, GenerationRequest, GenerationResult, ImageData, ImageOptions, ImageProvider,
    ProviderError, ProviderKind,
};

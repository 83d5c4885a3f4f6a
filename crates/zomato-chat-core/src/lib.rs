pub mod bubble;
pub mod client;
pub mod config;
pub mod conversation;
pub mod message;

// Re-export main types for convenience
pub use bubble::{BubbleStyle, MessageBubble};
pub use client::{BackendClient, ChatRequest, ClientError, HealthStatus, ToolInfo};
pub use config::Config;
pub use conversation::Conversation;
pub use message::{Message, Role};

//! Reasoning engine adapters

mod gemini;

pub use gemini::{GeminiGateway, GeminiSession};

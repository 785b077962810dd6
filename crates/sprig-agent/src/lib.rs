//! Text-generation collaborators for sprig.

pub mod anthropic;

pub use anthropic::AnthropicGenerator;

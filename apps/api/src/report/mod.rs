// Report generation: outline parsing, prompt assembly, provider call, export.
// All provider calls go through llm_client — nothing here talks HTTP directly.

pub mod export;
pub mod generator;
pub mod handlers;
pub mod outline;
pub mod prompts;

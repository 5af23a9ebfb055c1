// Shared prompt constants for completion calls.
// Report-specific prompt text lives next to the report builder.

/// System message that opens every report conversation.
pub const ASSISTANT_SYSTEM: &str = "You are a helpful assistant.";

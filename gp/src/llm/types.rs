//! LLM request/response types

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt carrying the instructions and the scheduling context
    pub system_prompt: String,

    /// User messages (often empty: the system prompt says it all)
    pub messages: Vec<Message>,

    /// Max tokens for response
    pub max_tokens: u32,

    /// Sampling temperature; scheduling prompts use 0
    pub temperature: f32,
}

impl CompletionRequest {
    /// Deterministic request with only a system prompt
    pub fn system(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system_prompt: prompt.into(),
            messages: vec![],
            max_tokens,
            temperature: 0.0,
        }
    }
}

/// A user message following the system prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub content: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { content: text.into() }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text content of the first choice, if any
    pub content: Option<String>,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

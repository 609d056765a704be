/// Text returned by a generation back end.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub content: String,
    /// Model that produced it, as reported by the provider
    pub model: String,
    pub usage: Usage,
}

/// Token accounting for one call. Missing counters are reported as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

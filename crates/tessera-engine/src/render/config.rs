use crate::text::DEFAULT_TEXT_CAPACITY;

/// Quads per batch unless configured otherwise.
pub const DEFAULT_BATCH_CAPACITY: usize = 1024;

/// What the renderer does when a draw call fails.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ErrorPolicy {
    /// Log the error and terminate the process with status 1.
    #[default]
    Fatal,
    /// Return the error to the caller.
    Propagate,
}

/// Renderer tuning.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Quad capacity of each of the three batches.
    pub batch_capacity: usize,
    /// Byte capacity for text formatted by `draw_text_fmt`.
    pub text_capacity: usize,
    pub error_policy: ErrorPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            text_capacity: DEFAULT_TEXT_CAPACITY,
            error_policy: ErrorPolicy::Fatal,
        }
    }
}

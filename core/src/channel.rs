//! Channel configuration for worker -> collector communication

/// Buffer sizing for the outcome channel
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Outcome channel capacity (workers -> collector), never zero
    outcome_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            outcome_buffer: 1_024,
        }
    }
}

impl ChannelConfig {
    /// Set the outcome buffer capacity (minimum 1)
    pub fn with_outcome_buffer(mut self, size: usize) -> Self {
        self.outcome_buffer = size.max(1);
        self
    }

    /// Outcome channel capacity
    pub fn outcome_buffer(&self) -> usize {
        self.outcome_buffer
    }
}

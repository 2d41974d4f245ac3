//! Engine configuration.

use crate::confirm::ConfirmPolicy;

/// Default command marker; `dq roll 2d6` is a command, `roll 2d6` is not.
pub const DEFAULT_MARKER: &str = "dq";

/// Configuration for an [`crate::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Word every command starts with.
    pub marker: String,

    /// How a second confirmation request is treated while one is pending.
    pub confirm_policy: ConfirmPolicy,

    /// Fixed RNG seed for reproducible rolls.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            confirm_policy: ConfirmPolicy::default(),
            seed: None,
        }
    }

    /// Set the command marker.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set the confirmation conflict policy.
    pub fn with_confirm_policy(mut self, policy: ConfirmPolicy) -> Self {
        self.confirm_policy = policy;
        self
    }

    /// Seed the dice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

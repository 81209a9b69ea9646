use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

// The minimum distance the pointer must travel before a new point is added.
// Too small gives lots of points that need to be analyzed; too large makes
// strokes composed of lines look halting.
pub const DEFAULT_MIN_SEGMENT_LENGTH: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("minimum segment length must be finite, got {0}")]
    NonFiniteThreshold(f32),

    #[error("minimum segment length must not be negative, got {0}")]
    NegativeThreshold(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    // Sampling threshold, in the same units as incoming pointer positions.
    pub min_segment_length: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
        }
    }
}

impl CaptureConfig {
    pub fn with_min_segment_length(min_segment_length: f32) -> Self {
        Self { min_segment_length }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.min_segment_length;
        if !len.is_finite() {
            return Err(ConfigError::NonFiniteThreshold(len));
        }
        if len < 0.0 {
            return Err(ConfigError::NegativeThreshold(len));
        }
        Ok(())
    }
}

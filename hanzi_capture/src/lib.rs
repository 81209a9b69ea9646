extern crate wasm_bindgen;
extern crate serde_derive;

mod capture;
mod config;
mod entities;
mod listeners;
mod paint;

use thiserror::Error;
use tracing::warn;
use wasm_bindgen::prelude::*;

pub use capture::{CaptureState, StrokeCapture};
pub use config::{CaptureConfig, ConfigError, DEFAULT_MIN_SEGMENT_LENGTH};
pub use entities::{Character, Point, Stroke};
pub use listeners::StrokesListener;
pub use paint::{paint, stroke_segments, PaintStyle, Painter, Segment};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error("stroke {index} has {points} point(s); a stroke needs at least two")]
    ShortStroke { index: usize, points: usize },

    #[error("point {point} of stroke {stroke} has {len} coordinate(s); expected [x, y]")]
    MalformedPoint { stroke: usize, point: usize, len: usize },
}

// Browser-facing handle around a StrokeCapture. The page forwards its pointer
// events here and reads strokes back as JSON for the lookup engine.
#[wasm_bindgen]
pub struct WasmCapture {
    capture: StrokeCapture,
}

#[wasm_bindgen]
impl WasmCapture {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCapture {
        WasmCapture {
            capture: StrokeCapture::new(),
        }
    }

    pub fn with_min_segment_length(min_segment_length: f32) -> WasmCapture {
        let config = CaptureConfig::with_min_segment_length(min_segment_length);
        let capture = StrokeCapture::with_config(config).unwrap_or_else(|err| {
            warn!(%err, "falling back to default capture configuration");
            StrokeCapture::new()
        });
        WasmCapture { capture }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.capture.on_pointer_down(Point::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.capture.on_pointer_move(Point::new(x, y))
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.capture.on_pointer_up(Point::new(x, y))
    }

    pub fn undo(&mut self) {
        self.capture.undo();
    }

    pub fn clear(&mut self) {
        self.capture.clear();
    }

    pub fn stroke_count(&self) -> usize {
        self.capture.character().stroke_count()
    }

    // Strokes as [[[x, y], ...], ...]
    pub fn strokes_json(&self) -> String {
        strokes_json(self.capture.character())
    }
}

impl Default for WasmCapture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn strokes_json(character: &Character) -> String {
    serde_json::to_string(&character.to_nested()).unwrap_or_else(|err| {
        warn!(%err, strokes = character.stroke_count(), "failed to serialize strokes");
        String::from("[]")
    })
}

use serde_derive::{Deserialize, Serialize};

use super::capture::StrokeCapture;
use super::entities::*;

// Line between two consecutive points of a stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

// How strokes are drawn. Lines have round caps and joins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintStyle {
    pub width: f32,
    // RGBA
    pub color: [u8; 4],
    pub antialias: bool,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            width: 3.0,
            color: [0, 0, 0, 255],
            antialias: true,
        }
    }
}

// Implemented by the host's drawing surface.
pub trait Painter {
    fn draw_line(&mut self, segment: Segment, style: &PaintStyle);
}

pub fn stroke_segments(stroke: &Stroke) -> impl Iterator<Item = Segment> + '_ {
    stroke
        .points()
        .windows(2)
        .map(|pair| Segment { from: pair[0], to: pair[1] })
}

impl StrokeCapture {
    // Everything that should be on screen: the stroke still being drawn
    // first, then the finished strokes in the order they were drawn.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.in_progress()
            .into_iter()
            .chain(self.character().strokes().iter())
            .flat_map(|stroke| stroke_segments(stroke))
    }
}

// Feeds every visible segment to the painter; returns the number of lines drawn
pub fn paint<P: Painter>(capture: &StrokeCapture, style: &PaintStyle, painter: &mut P) -> usize {
    let mut count = 0;
    for segment in capture.segments() {
        painter.draw_line(segment, style);
        count += 1;
    }
    count
}

use serde_derive::{Deserialize, Serialize};

use super::CaptureError;

// A single sampled pointer position
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    // Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// One continuous gesture; points are kept in the order they were sampled
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub(crate) fn starting_at(first: Point) -> Stroke {
        Stroke { points: vec![first] }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

// The handwritten shape composed so far: finalized strokes in drawing order.
// Every stroke held by a Character has at least two points; deserializing
// goes through the same check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(try_from = "RawCharacter")]
pub struct Character {
    strokes: Vec<Stroke>,
}

// Unchecked wire form of a Character
#[derive(Deserialize)]
struct RawCharacter {
    strokes: Vec<Stroke>,
}

impl TryFrom<RawCharacter> for Character {
    type Error = CaptureError;

    fn try_from(raw: RawCharacter) -> Result<Character, CaptureError> {
        for (ix, stroke) in raw.strokes.iter().enumerate() {
            if stroke.len() < 2 {
                return Err(CaptureError::ShortStroke {
                    index: ix,
                    points: stroke.len(),
                });
            }
        }
        Ok(Character { strokes: raw.strokes })
    }
}

impl Character {
    pub fn new() -> Character {
        Character { strokes: Vec::new() }
    }

    // Builds a character from the nested array layout lookup engines consume:
    // strokes, each a list of [x, y] pairs.
    pub fn from_nested(input: &[Vec<Vec<f32>>]) -> Result<Character, CaptureError> {
        let mut strokes: Vec<Stroke> = Vec::with_capacity(input.len());
        for (stroke_ix, raw_stroke) in input.iter().enumerate() {
            if raw_stroke.len() < 2 {
                return Err(CaptureError::ShortStroke {
                    index: stroke_ix,
                    points: raw_stroke.len(),
                });
            }
            let mut points: Vec<Point> = Vec::with_capacity(raw_stroke.len());
            for (point_ix, raw_point) in raw_stroke.iter().enumerate() {
                match raw_point.as_slice() {
                    [x, y] => points.push(Point::new(*x, *y)),
                    _ => {
                        return Err(CaptureError::MalformedPoint {
                            stroke: stroke_ix,
                            point: point_ix,
                            len: raw_point.len(),
                        })
                    }
                }
            }
            strokes.push(Stroke { points });
        }
        Ok(Character { strokes })
    }

    // Inverse of from_nested
    pub fn to_nested(&self) -> Vec<Vec<Vec<f32>>> {
        self.strokes
            .iter()
            .map(|stroke| stroke.points.iter().map(|pt| vec![pt.x, pt.y]).collect())
            .collect()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub(crate) fn add_stroke(&mut self, stroke: Stroke) {
        debug_assert!(stroke.len() >= 2, "Finalized strokes need at least two points.");
        self.strokes.push(stroke);
    }

    pub(crate) fn remove_last_stroke(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.strokes.clear();
    }
}

use std::sync::Arc;

use tracing::{debug, trace};

use super::config::{CaptureConfig, ConfigError};
use super::entities::*;
use super::listeners::*;

// Where the capture is within the current gesture
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    // No pointer is down
    Idle,
    // Pointer is down, but it hasn't moved far enough for a second point
    TrackingFirstPoint(Point),
    // A stroke is being built; its last point is the last one recorded
    TrackingStroke(Stroke),
}

// Turns pointer events into the strokes of a Character.
// The host UI forwards pointer down, move and release events. Moves shorter
// than the configured minimum segment length are dropped; a stroke only comes
// into existence once the pointer has travelled that far from where it was
// pressed. Each pointer method returns `true` when the visible shape changed
// and the host should redraw.
pub struct StrokeCapture {
    config: CaptureConfig,
    character: Character,
    state: CaptureState,
    listeners: ListenerRegistry,
}

impl Default for StrokeCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeCapture {
    pub fn new() -> StrokeCapture {
        StrokeCapture {
            config: CaptureConfig::default(),
            character: Character::new(),
            state: CaptureState::Idle,
            listeners: ListenerRegistry::default(),
        }
    }

    pub fn with_config(config: CaptureConfig) -> Result<StrokeCapture, ConfigError> {
        config.validate()?;
        Ok(StrokeCapture {
            config,
            ..StrokeCapture::new()
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    // The live character. Consumers such as a lookup engine read it from here.
    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    // The stroke being drawn right now, not yet part of the character
    pub fn in_progress(&self) -> Option<&Stroke> {
        match &self.state {
            CaptureState::TrackingStroke(stroke) => Some(stroke),
            _ => None,
        }
    }

    // Pressing the pointer only remembers where the next stroke may start
    pub fn on_pointer_down(&mut self, position: Point) {
        if let CaptureState::TrackingStroke(stroke) = &self.state {
            debug!(points = stroke.len(), "discarding unfinished stroke");
        }
        self.state = CaptureState::TrackingFirstPoint(position);
    }

    pub fn on_pointer_move(&mut self, position: Point) -> bool {
        let min_len = self.config.min_segment_length;
        match &mut self.state {
            CaptureState::Idle => false,
            CaptureState::TrackingFirstPoint(first) => {
                let first = *first;
                if first.distance(position) < min_len {
                    trace!(x = position.x, y = position.y, "sample ignored");
                    return false;
                }
                let mut stroke = Stroke::starting_at(first);
                stroke.push(position);
                trace!(x = position.x, y = position.y, "stroke started");
                self.state = CaptureState::TrackingStroke(stroke);
                true
            }
            CaptureState::TrackingStroke(stroke) => {
                let accept = match stroke.last() {
                    Some(last) => last.distance(position) >= min_len,
                    None => true,
                };
                if !accept {
                    trace!(x = position.x, y = position.y, "sample ignored");
                    return false;
                }
                stroke.push(position);
                trace!(x = position.x, y = position.y, points = stroke.len(), "sample added");
                true
            }
        }
    }

    // Samples the release position like a move, moves any finished stroke into
    // the character, and notifies listeners. Listeners are notified on every
    // release, whether or not a stroke was added.
    pub fn on_pointer_up(&mut self, position: Point) -> bool {
        let mut redraw = self.on_pointer_move(position);
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::TrackingStroke(stroke) => {
                debug!(
                    points = stroke.len(),
                    strokes = self.character.stroke_count() + 1,
                    "stroke finished"
                );
                self.character.add_stroke(stroke);
                redraw = true;
            }
            CaptureState::TrackingFirstPoint(_) => {
                trace!("pointer released without a stroke");
            }
            CaptureState::Idle => {}
        }
        self.listeners.notify();
        redraw
    }

    // Drops the most recently finished stroke; leaves any stroke in progress alone
    pub fn undo(&mut self) {
        if let Some(stroke) = self.character.remove_last_stroke() {
            debug!(points = stroke.len(), strokes = self.character.stroke_count(), "undo");
        }
    }

    pub fn clear(&mut self) {
        self.character.clear();
        self.state = CaptureState::Idle;
        debug!("cleared");
    }

    // Registers a listener. Returns `false` if that same listener (by identity)
    // was already registered.
    pub fn add_listener(&self, listener: Arc<dyn StrokesListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, listener: &Arc<dyn StrokesListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pt(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn counted(capture: &StrokeCapture) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        capture.add_listener(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        hits
    }

    #[test]
    fn test_worked_example() {
        let mut capture = StrokeCapture::new();
        let hits = counted(&capture);
        capture.on_pointer_down(pt(0.0, 0.0));
        assert!(!capture.on_pointer_move(pt(3.0, 3.0)));
        assert!(capture.in_progress().is_none());
        assert!(capture.on_pointer_move(pt(10.0, 0.0)));
        assert_eq!(capture.in_progress().unwrap().points(), [pt(0.0, 0.0), pt(10.0, 0.0)]);
        assert!(capture.on_pointer_up(pt(10.0, 0.0)));

        let character = capture.character();
        assert_eq!(character.stroke_count(), 1);
        assert_eq!(character.strokes()[0].points(), [pt(0.0, 0.0), pt(10.0, 0.0)]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(*capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_small_moves_make_no_stroke() {
        let mut capture = StrokeCapture::new();
        capture.on_pointer_down(pt(50.0, 50.0));
        for (x, y) in [(51.0, 50.0), (53.0, 52.0), (47.0, 47.0), (50.0, 54.9)] {
            assert!(!capture.on_pointer_move(pt(x, y)));
        }
        assert_eq!(*capture.state(), CaptureState::TrackingFirstPoint(pt(50.0, 50.0)));
        assert!(!capture.on_pointer_up(pt(52.0, 51.0)));
        assert!(capture.character().is_empty());
    }

    #[test]
    fn test_each_accepted_point_grows_stroke() {
        let mut capture = StrokeCapture::new();
        capture.on_pointer_down(pt(0.0, 0.0));
        // One unit at a time along a line: only every fifth position is kept
        for x in 1..=20 {
            let before = capture.in_progress().map_or(0, Stroke::len);
            let redraw = capture.on_pointer_move(pt(x as f32, 0.0));
            let after = capture.in_progress().map_or(0, Stroke::len);
            if x % 5 == 0 {
                assert!(redraw);
                assert_eq!(after, if x == 5 { 2 } else { before + 1 });
            } else {
                assert!(!redraw);
                assert_eq!(after, before);
            }
        }
        capture.on_pointer_up(pt(20.0, 0.0));
        let xs: Vec<f32> = capture.character().strokes()[0].points().iter().map(|p| p.x).collect();
        assert_eq!(xs, [0.0, 5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_distance_measured_from_last_recorded_point() {
        let mut capture = StrokeCapture::new();
        capture.on_pointer_down(pt(0.0, 0.0));
        assert!(capture.on_pointer_move(pt(6.0, 0.0)));
        // 4 from the last recorded point, though 10 from where the stroke started
        assert!(!capture.on_pointer_move(pt(10.0, 0.0)));
        assert!(capture.on_pointer_move(pt(11.0, 0.0)));
        assert_eq!(capture.in_progress().unwrap().len(), 3);
    }

    #[test]
    fn test_release_samples_like_move() {
        let mut capture = StrokeCapture::new();
        capture.on_pointer_down(pt(0.0, 0.0));
        assert!(capture.on_pointer_up(pt(0.0, 8.0)));
        assert_eq!(capture.character().strokes()[0].points(), [pt(0.0, 0.0), pt(0.0, 8.0)]);
    }

    #[test]
    fn test_click_still_notifies() {
        let mut capture = StrokeCapture::new();
        let hits = counted(&capture);
        capture.on_pointer_down(pt(20.0, 20.0));
        assert!(!capture.on_pointer_up(pt(20.0, 20.0)));
        assert!(capture.character().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // A release with no press at all is still the end of a gesture
        capture.on_pointer_up(pt(1.0, 1.0));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut capture = StrokeCapture::new();
        assert!(!capture.on_pointer_move(pt(100.0, 100.0)));
        assert_eq!(*capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_press_overwrites_pending_point() {
        let mut capture = StrokeCapture::new();
        capture.on_pointer_down(pt(0.0, 0.0));
        capture.on_pointer_move(pt(10.0, 0.0));
        capture.on_pointer_down(pt(100.0, 100.0));
        assert!(capture.in_progress().is_none());
        capture.on_pointer_move(pt(100.0, 110.0));
        capture.on_pointer_up(pt(100.0, 110.0));
        assert_eq!(capture.character().strokes()[0].points(), [pt(100.0, 100.0), pt(100.0, 110.0)]);
    }

    #[test]
    fn test_strokes_in_drawing_order() {
        let mut capture = StrokeCapture::new();
        let hits = counted(&capture);
        for i in 0..3 {
            let y = (i * 20) as f32;
            capture.on_pointer_down(pt(0.0, y));
            capture.on_pointer_move(pt(30.0, y));
            capture.on_pointer_up(pt(60.0, y));
        }
        let starts: Vec<f32> = capture.character().strokes().iter().map(|s| s.points()[0].y).collect();
        assert_eq!(starts, [0.0, 20.0, 40.0]);
        assert!(capture.character().strokes().iter().all(|s| s.len() == 3));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_undo() {
        let mut capture = StrokeCapture::new();
        capture.undo();
        assert!(capture.character().is_empty());

        capture.on_pointer_down(pt(0.0, 0.0));
        capture.on_pointer_up(pt(10.0, 0.0));
        capture.on_pointer_down(pt(0.0, 10.0));
        capture.on_pointer_up(pt(10.0, 10.0));
        assert_eq!(capture.character().stroke_count(), 2);

        // Undo in the middle of a stroke removes the last finished one only
        capture.on_pointer_down(pt(0.0, 20.0));
        capture.on_pointer_move(pt(10.0, 20.0));
        capture.undo();
        assert_eq!(capture.character().stroke_count(), 1);
        assert_eq!(capture.character().strokes()[0].points()[0], pt(0.0, 0.0));
        assert!(capture.in_progress().is_some());
        capture.on_pointer_up(pt(20.0, 20.0));
        assert_eq!(capture.character().stroke_count(), 2);
    }

    #[test]
    fn test_clear() {
        let mut capture = StrokeCapture::new();
        capture.on_pointer_down(pt(0.0, 0.0));
        capture.on_pointer_up(pt(10.0, 0.0));
        capture.on_pointer_down(pt(0.0, 10.0));
        capture.on_pointer_move(pt(10.0, 10.0));
        capture.clear();
        assert!(capture.character().is_empty());
        assert!(capture.in_progress().is_none());
        assert_eq!(*capture.state(), CaptureState::Idle);
        // Nothing left to continue from
        assert!(!capture.on_pointer_move(pt(30.0, 10.0)));
        capture.clear();
        assert!(capture.character().is_empty());
    }

    #[test]
    fn test_custom_threshold() {
        let config = CaptureConfig::with_min_segment_length(2.0);
        let mut capture = StrokeCapture::with_config(config).unwrap();
        capture.on_pointer_down(pt(0.0, 0.0));
        assert!(capture.on_pointer_move(pt(3.0, 0.0)));
        assert!(StrokeCapture::with_config(CaptureConfig::with_min_segment_length(-2.0)).is_err());
    }

    #[test]
    fn test_zero_threshold_keeps_every_sample() {
        let mut capture = StrokeCapture::with_config(CaptureConfig::with_min_segment_length(0.0)).unwrap();
        capture.on_pointer_down(pt(1.0, 1.0));
        assert!(capture.on_pointer_move(pt(1.0, 1.0)));
        assert!(capture.on_pointer_move(pt(1.0, 1.0)));
        capture.on_pointer_up(pt(1.0, 1.0));
        assert_eq!(capture.character().point_count(), 4);
    }

    #[test]
    fn test_listener_removal() {
        let mut capture = StrokeCapture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let listener: Arc<dyn StrokesListener> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(capture.add_listener(listener.clone()));
        assert!(!capture.add_listener(listener.clone()));
        capture.on_pointer_up(pt(0.0, 0.0));
        assert!(capture.remove_listener(&listener));
        assert_eq!(capture.listener_count(), 0);
        capture.on_pointer_up(pt(0.0, 0.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listeners_registered_from_threads() {
        use std::sync::Mutex;
        use std::thread;

        let mut capture = StrokeCapture::new();
        let log: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = |thread_ix: usize, ix: usize| -> Arc<dyn StrokesListener> {
            let log = log.clone();
            Arc::new(move || log.lock().unwrap().push((thread_ix, ix)))
        };
        let shared = recorder(99, 0);
        let shared_added = AtomicUsize::new(0);

        thread::scope(|scope| {
            for thread_ix in 0..4 {
                let capture = &capture;
                let shared = &shared;
                let shared_added = &shared_added;
                let recorder = &recorder;
                scope.spawn(move || {
                    let own: Vec<Arc<dyn StrokesListener>> = (0..3).map(|ix| recorder(thread_ix, ix)).collect();
                    for listener in &own {
                        assert!(capture.add_listener(listener.clone()));
                    }
                    if capture.add_listener(shared.clone()) {
                        shared_added.fetch_add(1, Ordering::SeqCst);
                    }
                    assert!(!capture.add_listener(own[0].clone()));
                    assert!(capture.remove_listener(&own[1]));
                    assert!(!capture.remove_listener(&own[1]));
                });
            }
        });

        assert_eq!(shared_added.load(Ordering::SeqCst), 1);
        assert_eq!(capture.listener_count(), 4 * 2 + 1);
        assert!(!capture.add_listener(shared.clone()));
        let last = recorder(100, 0);
        assert!(capture.add_listener(last));

        capture.on_pointer_down(pt(0.0, 0.0));
        capture.on_pointer_up(pt(0.0, 20.0));

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 4 * 2 + 2);
        assert_eq!(log.iter().filter(|x| **x == (99, 0)).count(), 1);
        assert_eq!(log.last(), Some(&(100, 0)));
        for thread_ix in 0..4 {
            let first = log.iter().position(|x| *x == (thread_ix, 0)).unwrap();
            let third = log.iter().position(|x| *x == (thread_ix, 2)).unwrap();
            assert!(first < third, "listeners of one thread must be notified in registration order");
            assert!(!log.contains(&(thread_ix, 1)));
        }
    }
}

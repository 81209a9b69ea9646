extern crate serde_derive;
extern crate hanzi_capture;

use anyhow::{bail, Context, Result};
use serde_derive::{Serialize, Deserialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Instant};
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::{info, Level};
use hanzi_capture::{CaptureConfig, Point, StrokeCapture};

const ITERS: usize = 10_000;
const DEFAULT_SESSIONS: &str = "debug/sessions.txt";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct PointerEvent {
    kind: PointerKind,
    x: f32,
    y: f32,
}

// One recorded drawing of a character
#[derive(Serialize, Deserialize)]
struct Session {
    char: String,
    events: Vec<PointerEvent>,
}

fn read_sessions(fname: &str) -> Result<Vec<Session>> {
    let mut res: Vec<Session> = Vec::new();
    let file = File::open(fname).with_context(|| format!("failed to open {}", fname))?;
    for (ix, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {} of {}", ix + 1, fname))?;
        if line.trim().is_empty() { continue; }
        let session: Session = serde_json::from_str(&line)
            .with_context(|| format!("line {} of {} is not a valid session", ix + 1, fname))?;
        res.push(session);
    }
    Ok(res)
}

fn read_config(fname: &str) -> Result<CaptureConfig> {
    let file = File::open(fname).with_context(|| format!("failed to open {}", fname))?;
    let config: CaptureConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a valid capture configuration", fname))?;
    config.validate()?;
    Ok(config)
}

fn replay(capture: &mut StrokeCapture, events: &[PointerEvent]) {
    for evt in events {
        let pos = Point::new(evt.x, evt.y);
        match evt.kind {
            PointerKind::Down => capture.on_pointer_down(pos),
            PointerKind::Move => { capture.on_pointer_move(pos); }
            PointerKind::Up => { capture.on_pointer_up(pos); }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 3 {
        bail!("usage: {} [SESSIONS_FILE] [CONFIG_JSON]", args[0]);
    }
    let sessions_file = args.get(1).map(String::as_str).unwrap_or(DEFAULT_SESSIONS);
    let config = match args.get(2) {
        Some(fname) => read_config(fname)?,
        None => CaptureConfig::default(),
    };
    info!(min_segment_length = config.min_segment_length, "capture configured");

    println!("Loading recorded sessions.");
    let sessions = read_sessions(sessions_file)?;
    for session in &sessions {
        let mut capture = StrokeCapture::with_config(config)?;
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        capture.add_listener(Arc::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        replay(&mut capture, &session.events);
        let character = capture.character();
        println!("{}: {} strokes, {} points, {} notifications",
                 session.char, character.stroke_count(), character.point_count(), notified.load(Ordering::Relaxed));
        println!("{}", hanzi_capture::strokes_json(character));
    }

    println!("Loaded {} sessions; starting {} cycles of replay.", sessions.len(), ITERS);
    let start = Instant::now();
    let mut strokes = 0;
    for _ in 0..ITERS {
        for session in &sessions {
            let mut capture = StrokeCapture::with_config(config)?;
            replay(&mut capture, &session.events);
            strokes += capture.character().stroke_count();
        }
    }
    let duration = start.elapsed();
    println!("Finished in {:?}. Strokes captured: {}.", duration, strokes);
    Ok(())
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

// Notified every time a pointer gesture on the capture is released.
// This fires even when the gesture was too short to produce a stroke, so it
// reads as "gesture ended" rather than "stroke added".
pub trait StrokesListener: Send + Sync {
    fn stroke_finished(&self);
}

impl<F> StrokesListener for F
where
    F: Fn() + Send + Sync,
{
    fn stroke_finished(&self) {
        self()
    }
}

// Listeners are told apart by the address they point to, not by value
fn same_listener(a: &Arc<dyn StrokesListener>, b: &Arc<dyn StrokesListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

// Insertion-ordered set of listeners behind a lock
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: Mutex<Vec<Arc<dyn StrokesListener>>>,
}

impl ListenerRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn StrokesListener>>> {
        // A listener that panicked mid-notification leaves the list itself intact
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, listener: Arc<dyn StrokesListener>) -> bool {
        let mut listeners = self.lock();
        if listeners.iter().any(|x| same_listener(x, &listener)) {
            return false;
        }
        listeners.push(listener);
        debug!(count = listeners.len(), "strokes listener added");
        true
    }

    pub fn remove(&self, listener: &Arc<dyn StrokesListener>) -> bool {
        let mut listeners = self.lock();
        let ix = listeners.iter().position(|x| same_listener(x, listener));
        match ix {
            Some(ix) => {
                listeners.remove(ix);
                debug!(count = listeners.len(), "strokes listener removed");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // Callbacks run with the lock held; they must not touch the registry.
    pub fn notify(&self) {
        let listeners = self.lock();
        for listener in listeners.iter() {
            listener.stroke_finished();
        }
    }
}

//! Call-order bookkeeping shared by all widgets.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    Created,
    Initialized,
    Disposed,
}

/// Tracks where a widget is in `init` → `render`* → `dispose`, and which result set it last
/// rendered, so that late answers to superseded searches are ignored.
#[derive(Debug, Default)]
pub struct Lifecycle {
    phase: LifecyclePhase,
    last_request_id: Cell<Option<u64>>,
}

impl Lifecycle {
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Returns false (and changes nothing) unless the widget was just created.
    pub fn begin_init(&mut self, attribute: &str) -> bool {
        if self.phase != LifecyclePhase::Created {
            tracing::warn!("Ignoring init of {} in phase {:?}", attribute, self.phase);
            return false;
        }
        self.phase = LifecyclePhase::Initialized;
        true
    }

    pub fn can_render(&self, attribute: &str) -> bool {
        if self.phase != LifecyclePhase::Initialized {
            tracing::warn!("Ignoring render of {} in phase {:?}", attribute, self.phase);
            return false;
        }
        true
    }

    pub fn begin_dispose(&mut self, attribute: &str) -> bool {
        if self.phase == LifecyclePhase::Disposed {
            tracing::warn!("Ignoring repeated dispose of {}", attribute);
            return false;
        }
        self.phase = LifecyclePhase::Disposed;
        true
    }

    /// Accepts contexts without a request id, and ids not older than the newest seen.
    pub fn accept_request(&self, attribute: &str, request_id: Option<u64>) -> bool {
        let Some(request_id) = request_id else { return true };
        match self.last_request_id.get() {
            Some(last) if request_id < last => {
                tracing::debug!("Dropping stale render of {} for request {} (latest {})", attribute, request_id, last);
                false
            }
            _ => {
                self.last_request_id.set(Some(request_id));
                true
            }
        }
    }
}

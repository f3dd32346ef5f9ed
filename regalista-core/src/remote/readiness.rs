//! Readiness of a remote: two independent setup steps gate every call.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// The provider transport was located.
    Transport,
    /// OAuth client identity is configured.
    Identity,
}

type Callback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct State {
    transport: bool,
    identity: bool,
    fired: bool,
    callbacks: Vec<Callback>,
}

/// Shared readiness flag. `on_ready` callbacks fire exactly once, when the
/// last component comes up.
#[derive(Clone, Default)]
pub struct Readiness {
    state: Arc<Mutex<State>>,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    /// A readiness that is already complete.
    pub fn ready_now() -> Self {
        let readiness = Self::new();
        readiness.mark_ready(Component::Transport);
        readiness.mark_ready(Component::Identity);
        readiness
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ready(&self) -> bool {
        self.lock().fired
    }

    pub fn mark_ready(&self, component: Component) {
        let callbacks = {
            let mut state = self.lock();
            match component {
                Component::Transport => state.transport = true,
                Component::Identity => state.identity = true,
            }
            if state.fired || !(state.transport && state.identity) {
                return;
            }
            state.fired = true;
            std::mem::take(&mut state.callbacks)
        };

        tracing::debug!("remote ready");
        for callback in callbacks {
            callback();
        }
    }

    /// Run `callback` once everything is ready (immediately if it already is).
    pub fn on_ready(&self, callback: impl FnOnce() + Send + 'static) {
        {
            let mut state = self.lock();
            if !state.fired {
                state.callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ready_needs_both_components() {
        let readiness = Readiness::new();
        assert!(!readiness.ready());
        readiness.mark_ready(Component::Identity);
        assert!(!readiness.ready());
        readiness.mark_ready(Component::Transport);
        assert!(readiness.ready());
    }

    #[test]
    fn test_callback_fires_exactly_once() {
        let readiness = Readiness::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        readiness.on_ready(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        readiness.mark_ready(Component::Transport);
        readiness.mark_ready(Component::Identity);
        readiness.mark_ready(Component::Identity);
        readiness.mark_ready(Component::Transport);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_subscriber_runs_immediately() {
        let readiness = Readiness::ready_now();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        readiness.on_ready(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

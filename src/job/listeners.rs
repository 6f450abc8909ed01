use std::collections::HashMap;
use std::sync::Arc;

use super::state::JobState;

/// Callbacks keyed by the lifecycle state they wait for.
///
/// `T` is the argument handed to each callback alongside the error message,
/// normally the job itself.
pub struct ListenerRegistry<T: ?Sized> {
    listeners: HashMap<JobState, Vec<Listener<T>>>,
}

pub type Listener<T> = Arc<dyn Fn(Option<&str>, &T) + Send + Sync>;

impl<T: ?Sized> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<T: ?Sized> ListenerRegistry<T> {
    pub fn register(&mut self, state: JobState, listener: Listener<T>) {
        self.listeners.entry(state).or_default().push(listener);
    }

    /// Listeners for `state` in registration order.
    pub fn for_state(&self, state: JobState) -> Vec<Listener<T>> {
        self.listeners.get(&state).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

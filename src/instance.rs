use alloc::{collections::BTreeMap, sync::Arc};
use parking_lot::{const_mutex, Condvar, Mutex};
use tracing::{debug, error};

use crate::{
    any::RcAny,
    binding::{definition_error, Binding},
    context::ResolutionContext,
    errors::{KeyPath, ResolveErrorKind},
};

/// Resolution each waiting resolution waits for, keyed by the waiter
static WAITING: Mutex<BTreeMap<usize, usize>> = const_mutex(BTreeMap::new());

/// A binding together with the creation state its kind requires
pub(crate) enum Instance {
    Factory(Binding),
    Single(Binding, ValueCell),
    Multi(Binding, Mutex<BTreeMap<u64, Arc<ValueCell>>>),
}

impl Instance {
    #[inline]
    #[must_use]
    pub(crate) fn binding(&self) -> &Binding {
        match self {
            Instance::Factory(binding) | Instance::Single(binding, _) | Instance::Multi(binding, _) => binding,
        }
    }

    pub(crate) fn get(&self, context: &ResolutionContext) -> Result<RcAny, ResolveErrorKind> {
        match self {
            Instance::Factory(binding) => create(binding, context),
            Instance::Single(binding, cell) => cell.get_or_create(context, || create(binding, context)),
            Instance::Multi(binding, cells) => {
                let parameters = context.parameters();
                if parameters.is_empty() {
                    return Err(ResolveErrorKind::MissingParameters {
                        key: binding.key().clone(),
                    });
                }

                let hash = parameters.hash_key();
                debug!(hash, "Multi instance");
                let cell = cells.lock().entry(hash).or_default().clone();
                cell.get_or_create(context, || create(binding, context))
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_count(&self) -> usize {
        match self {
            Instance::Factory(_) => 0,
            Instance::Single(_, cell) => usize::from(cell.is_ready()),
            Instance::Multi(_, cells) => cells.lock().values().filter(|cell| cell.is_ready()).count(),
        }
    }
}

#[inline]
fn create(binding: &Binding, context: &ResolutionContext) -> Result<RcAny, ResolveErrorKind> {
    binding.definition().call(context).map_err(definition_error)
}

enum CellState {
    Empty,
    /// Being created by the resolution with this id
    Creating(usize),
    Ready(RcAny),
}

/// Value created at most once.
///
/// The value is created without holding the cell lock. Concurrent resolutions wait for the creating one,
/// unless waiting would close a cycle of resolutions waiting for each other.
pub(crate) struct ValueCell {
    state: Mutex<CellState>,
    ready: Condvar,
}

impl Default for ValueCell {
    fn default() -> Self {
        Self {
            state: Mutex::new(CellState::Empty),
            ready: Condvar::new(),
        }
    }
}

impl ValueCell {
    /// # Errors
    /// Returns [`ResolveErrorKind::CyclicDependency`] if the value is already being created by
    /// this resolution or by one waiting for it, otherwise the error of `create`
    pub(crate) fn get_or_create<F>(&self, context: &ResolutionContext, create: F) -> Result<RcAny, ResolveErrorKind>
    where
        F: FnOnce() -> Result<RcAny, ResolveErrorKind>,
    {
        let resolution = context.resolution();
        let mut state = self.state.lock();
        loop {
            match &*state {
                CellState::Ready(value) => {
                    debug!("Found in cache");
                    return Ok(value.clone());
                }
                CellState::Empty => break,
                CellState::Creating(creator) => {
                    let creator = *creator;
                    if creator == resolution || !start_waiting(resolution, creator) {
                        let err = ResolveErrorKind::CyclicDependency {
                            path: KeyPath(context.path().to_vec()),
                        };
                        error!("{}", err);
                        return Err(err);
                    }
                    debug!(creator, "Waiting for concurrent creation");
                    self.ready.wait(&mut state);
                    WAITING.lock().remove(&resolution);
                }
            }
        }
        *state = CellState::Creating(resolution);
        drop(state);
        debug!("Not found in cache");

        let creating = Creating(self);
        let value = create()?;
        *self.state.lock() = CellState::Ready(value.clone());
        drop(creating);
        debug!("Cached");
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), CellState::Ready(_))
    }
}

/// Resets an unfinished creation and wakes the waiters
struct Creating<'a>(&'a ValueCell);

impl Drop for Creating<'_> {
    fn drop(&mut self) {
        let mut state = self.0.state.lock();
        if matches!(*state, CellState::Creating(_)) {
            *state = CellState::Empty;
        }
        drop(state);
        self.0.ready.notify_all();
    }
}

/// Records that `waiter` waits for `creator`.
/// Returns `false` without recording if `creator` already waits for `waiter`, directly or transitively.
fn start_waiting(waiter: usize, creator: usize) -> bool {
    let mut waiting = WAITING.lock();
    let mut current = creator;
    while let Some(&next) = waiting.get(&current) {
        if next == waiter {
            return false;
        }
        current = next;
    }
    waiting.insert(waiter, creator);
    true
}

#[cfg(test)]
mod tests {
    use super::{start_waiting, WAITING};

    #[test]
    fn test_waiting_cycle_rejected() {
        let (a, b, c) = (usize::MAX - 2, usize::MAX - 1, usize::MAX);

        assert!(start_waiting(a, b));
        assert!(start_waiting(b, c));
        assert!(!start_waiting(c, a));

        let mut waiting = WAITING.lock();
        waiting.remove(&a);
        waiting.remove(&b);
        assert!(!waiting.contains_key(&c));
    }
}

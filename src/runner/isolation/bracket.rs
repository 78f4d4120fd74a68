//! Per-thread call bracketing.
//!
//! Depth counters are kept per thread and per handle, so entering and leaving
//! a bracket never takes a cross-thread lock.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use crate::runner::ds::execution_context::set_context_loader;
use crate::runner::ds::loader::ModuleLoader;

use super::handle::{HandleInner, RuntimeHandle};

thread_local! {
    static CALL_DEPTH: RefCell<HashMap<Uuid, usize>> = RefCell::new(HashMap::new());
}

pub(super) fn depth(handle: Uuid) -> usize {
    CALL_DEPTH.with(|cell| cell.borrow().get(&handle).copied().unwrap_or(0))
}

/// Bump this thread's depth for `handle`, returning the new depth.
pub(super) fn increment(handle: Uuid) -> usize {
    CALL_DEPTH.with(|cell| {
        let mut depths = cell.borrow_mut();
        let depth = depths.entry(handle).or_insert(0);
        *depth += 1;
        *depth
    })
}

/// Drop this thread's depth for `handle`, returning the new depth.
fn decrement(handle: Uuid) -> usize {
    CALL_DEPTH.with(|cell| {
        let mut depths = cell.borrow_mut();
        let remaining = match depths.get_mut(&handle) {
            Some(depth) => {
                *depth = depth.saturating_sub(1);
                *depth
            }
            None => 0,
        };
        if remaining == 0 {
            depths.remove(&handle);
        }
        remaining
    })
}

/// One call into a [`RuntimeHandle`].
///
/// Entry switched the thread's context loader to the module's. Dropping the
/// bracket restores it; the outermost bracket on a thread also clears the
/// thread's dynamic bindings in the private realm.
pub struct CallBracket<'a> {
    handle: &'a RuntimeHandle,
    inner: Arc<HandleInner>,
    previous_loader: Option<Arc<ModuleLoader>>,
}

impl<'a> CallBracket<'a> {
    pub(super) fn new(handle: &'a RuntimeHandle, inner: Arc<HandleInner>) -> Self {
        let previous_loader = set_context_loader(Some(inner.loader.clone()));
        trace!(handle = %handle.id().to_hyphenated(), depth = depth(handle.id()), "bracket enter");
        CallBracket {
            handle,
            inner,
            previous_loader,
        }
    }

    pub(super) fn inner(&self) -> &HandleInner {
        &self.inner
    }
}

impl<'a> Drop for CallBracket<'a> {
    fn drop(&mut self) {
        let remaining = decrement(self.handle.id());
        trace!(handle = %self.handle.id().to_hyphenated(), depth = remaining, "bracket exit");
        if remaining == 0 {
            self.inner.store.clear();
            self.handle.thread_left(&self.inner);
        }
        set_context_loader(self.previous_loader.take());
    }
}

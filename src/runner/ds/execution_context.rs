//! Per-thread execution context.
//!
//! Each thread carries the loader its current call runs under. Isolated
//! handles swap it on bracket entry and restore it on exit; realms consult it
//! when a namespace is not found through their own loader root.

use std::cell::RefCell;
use std::sync::Arc;

use crate::runner::ds::loader::ModuleLoader;

thread_local! {
    static CONTEXT_LOADER: RefCell<Option<Arc<ModuleLoader>>> = RefCell::new(None);
}

/// Loader the current thread is running under, if any.
pub fn context_loader() -> Option<Arc<ModuleLoader>> {
    CONTEXT_LOADER.with(|cell| cell.borrow().clone())
}

/// Install `loader` as the thread's context loader, returning the previous one.
pub fn set_context_loader(loader: Option<Arc<ModuleLoader>>) -> Option<Arc<ModuleLoader>> {
    CONTEXT_LOADER.with(|cell| cell.replace(loader))
}

//! Standard namespaces of the reference runtime.
//!
//! `core` is interned into every realm directly. `text` and `io` live in the
//! standard registry and are loaded on first require.

pub mod core;
pub mod text;
pub mod io;

use crate::runner::plugin::registry::NamespaceRegistry;

pub use io::OutputBuffer;

/// Register the registry-backed standard namespaces.
pub fn register_std_namespaces(registry: &mut NamespaceRegistry) {
    text::register(registry);
    io::register(registry);
}

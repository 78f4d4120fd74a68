//! Namespace source trait for lazy loading of namespaces.
//!
//! Sources provide namespaces (like `text`, `io`) on demand. A namespace is
//! loaded only when something requires it or resolves a var inside it.

use crate::runner::ds::error::Result;
use crate::runner::plugin::types::NamespaceDef;

/// Something `require` and `load` can pull namespace definitions from.
///
/// Sources are queried in registration order; the first one that provides a
/// namespace wins.
pub trait NamespaceSource: Send + Sync {
    /// Does this source provide the namespace?
    ///
    /// Must be cheap and must not materialize anything.
    fn provides(&self, namespace: &str) -> bool;

    /// Materialize the namespace. Called only after `provides` returned true.
    fn load(&self, namespace: &str) -> Result<NamespaceDef>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

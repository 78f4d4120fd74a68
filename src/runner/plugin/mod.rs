//! Namespace sources and bridge configuration.
//!
//! A realm starts with only `core` interned. Every other namespace arrives
//! lazily, the first time something requires it or resolves one of its vars:
//!
//! ```text
//! Namespace lookup order for `text/trim`:
//! 1. Already interned in the realm
//! 2. The realm's loader root (module loader chain, parent first)
//! 3. The calling thread's context loader
//! 4. The realm's own sources ← the standard registry lives here
//! ```
//!
//! ### Key Components
//!
//! - **[`NamespaceSource`]**: Trait for providing namespace definitions on demand
//! - **[`NamespaceTable`]**: Ordered sources with an owner cache
//! - **[`RegistrySource`]**: Adapter wrapping [`NamespaceRegistry`] as a source
//! - **[`BridgeConfig`]**: JSON configuration for scripts and modules
//!
//! ## Example: Custom Source
//!
//! ```
//! use nsbridge::runner::ds::error::Result;
//! use nsbridge::runner::ds::function_object::Arity;
//! use nsbridge::runner::ds::value::Value;
//! use nsbridge::runner::plugin::resolver::NamespaceSource;
//! use nsbridge::runner::plugin::types::NamespaceDef;
//!
//! struct Utils;
//!
//! fn double(args: &[Value]) -> Result<Value> {
//!     match args.first() {
//!         Some(Value::Integer(n)) => Ok(Value::Integer(n * 2)),
//!         _ => Ok(Value::Integer(0)),
//!     }
//! }
//!
//! impl NamespaceSource for Utils {
//!     fn provides(&self, namespace: &str) -> bool {
//!         namespace == "utils"
//!     }
//!
//!     fn load(&self, namespace: &str) -> Result<NamespaceDef> {
//!         Ok(NamespaceDef::new(namespace).add_fn("double", Arity::Exact(1), double))
//!     }
//!
//!     fn name(&self) -> &str { "utils" }
//! }
//! ```

pub mod types;
pub mod registry;
pub mod config;
pub mod resolver;
pub mod core_resolver;
pub mod super_global;

pub use types::{NamespaceDef, PackageInfo};
pub use registry::NamespaceRegistry;
pub use config::{BridgeConfig, ModuleConfig};
pub use resolver::NamespaceSource;
pub use core_resolver::RegistrySource;
pub use super_global::NamespaceTable;

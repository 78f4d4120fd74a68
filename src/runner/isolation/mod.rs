//! Runtime isolation.
//!
//! Several independent realms can live in one process, one per module
//! loader. A [`RuntimeHandle`] owns one of them and brackets every call:
//!
//! ```text
//! host thread ──► enter bracket ──► context loader := module loader
//!                                   depth += 1
//!                      call ...
//!                 leave bracket ──► depth -= 1
//!                                   depth == 0 ? clear dynamic bindings
//!                                   context loader := previous
//! ```
//!
//! Closing a handle rejects new calls at once; the realm itself is shut down
//! when the last thread leaves its bracket.

pub mod handle;
pub mod bracket;
pub mod collaborators;

pub use bracket::CallBracket;
pub use collaborators::{BundledLocator, Distribution, ModuleActivator, RuntimeLocator};
pub use handle::{InstanceState, RuntimeHandle};

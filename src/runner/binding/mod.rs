//! Typed interface binding.
//!
//! A host type describes its methods with an [`InterfaceDef`] and receives a
//! [`Proxy`] that serves them. Each method is resolved to its foreign function
//! on first call and cached for the life of the proxy; arguments are checked
//! against the declared constraints on every call.

pub mod interface;
pub mod proxy;

pub use interface::{ForeignInterface, InterfaceDef, MethodDef, ParamDef};
pub use proxy::{BoundMethod, FromValue, Proxy};

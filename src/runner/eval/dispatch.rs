//! Variadic invocation dispatcher.
//!
//! Host call sites hand over an argument list of any length; realm functions
//! are entered through one fixed-arity entry point per argument count. The
//! table below picks the matching entry point for 0 through [`MAX_ARITY`]
//! arguments and refuses anything longer.

use std::convert::TryInto;

use tracing::trace;

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::function_object::ForeignFn;
use crate::runner::ds::value::Value;

/// Highest argument count with a fixed-arity entry point.
pub const MAX_ARITY: usize = 20;

macro_rules! fixed_arity_table {
    ($f:expr, $args:expr; $($n:literal)*) => {
        match $args.len() {
            $( $n => call_fixed::<$n>($f, $args), )*
            count => Err(BridgeError::UnsupportedArity {
                count,
                max: MAX_ARITY,
            }),
        }
    };
}

/// Call `f` with `args` through the fixed-arity convention.
pub fn dispatch(f: &ForeignFn, args: Vec<Value>) -> Result<Value> {
    trace!(function = f.name(), argc = args.len(), "dispatch");
    fixed_arity_table!(f, args; 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20)
}

fn call_fixed<const N: usize>(f: &ForeignFn, args: Vec<Value>) -> Result<Value> {
    let fixed: [Value; N] = args
        .try_into()
        .map_err(|rest: Vec<Value>| BridgeError::UnsupportedArity {
            count: rest.len(),
            max: MAX_ARITY,
        })?;
    f.invoke(fixed)
}

/// Call whatever a name resolved to.
///
/// Functions go through [`dispatch`]. Any other value is returned as-is when
/// no arguments are given (reading a var), and is an error otherwise.
pub fn invoke_value(callee: &Value, args: Vec<Value>) -> Result<Value> {
    match callee {
        Value::Function(f) => dispatch(f, args),
        other if args.is_empty() => Ok(other.clone()),
        other => Err(BridgeError::NotCallable {
            name: other.to_string(),
            actual: other.value_type(),
        }),
    }
}

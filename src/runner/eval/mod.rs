//! Evaluation of the sequencing DSL.
//!
//! This module contains the expression tree, the evaluator and the variadic
//! dispatcher the evaluator calls through.

pub mod types;
pub mod expression;
pub mod dispatch;

pub use types::{Arg, Block, EvalEnv, Expr, FnLiteral, Invocation, Let, LetBinding, ValueResult};
pub use expression::{evaluate_block, evaluate_expression};
pub use dispatch::{dispatch, invoke_value, MAX_ARITY};

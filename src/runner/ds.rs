pub mod alias;
pub mod error;
pub mod execution_context;
pub mod function_object;
pub mod loader;
pub mod realm;
pub mod scope;
pub mod symbol;
pub mod value;

mod api;
pub mod ast;

pub use api::{parse_program, parse_to_token_tree, FormsParser};
pub use ast::Program;

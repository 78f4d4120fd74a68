use crate::runner::eval::types::Block;

/// A parsed script: the alias declarations of its `require` form and the
/// forms that follow it.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub requires: Vec<String>,
    pub body: Block,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

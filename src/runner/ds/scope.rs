use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::value::Value;

/// Variables introduced by one `let`.
#[derive(Debug, Default, Clone)]
pub struct ScopeFrame {
    bindings: HashMap<String, Value>,
}

impl ScopeFrame {
    pub fn new() -> Self {
        ScopeFrame {
            bindings: HashMap::new(),
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn declare(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return Err(BridgeError::DuplicateBinding { name });
        }
        self.bindings.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Lexical frames of one DSL evaluation, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { frames: Vec::new() }
    }

    /// Innermost binding of `name`, if any frame declares it.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn push(&mut self, frame: ScopeFrame) {
        trace!(depth = self.frames.len() + 1, vars = frame.len(), "push frame");
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ScopeFrame> {
        trace!(depth = self.frames.len(), "pop frame");
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push `frame` for the lifetime of the returned guard.
    pub fn enter(&mut self, frame: ScopeFrame) -> ScopeGuard<'_> {
        self.push(frame);
        ScopeGuard { stack: self }
    }
}

/// Pops its frame when dropped, whichever way the block is left.
pub struct ScopeGuard<'a> {
    stack: &'a mut ScopeStack,
}

impl<'a> Deref for ScopeGuard<'a> {
    type Target = ScopeStack;

    fn deref(&self) -> &ScopeStack {
        self.stack
    }
}

impl<'a> DerefMut for ScopeGuard<'a> {
    fn deref_mut(&mut self) -> &mut ScopeStack {
        self.stack
    }
}

impl<'a> Drop for ScopeGuard<'a> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

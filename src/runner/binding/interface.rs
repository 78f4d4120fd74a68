//! Host interface descriptions.
//!
//! An [`InterfaceDef`] is the registration table for one host interface:
//! which namespaces it aliases, and for each method the alias of the
//! namespace the function lives in plus per-parameter type constraints.

use std::collections::HashMap;

use crate::runner::ds::value::{Value, ValueType};

use super::proxy::Proxy;

/// One parameter. An empty constraint set accepts anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub accepts: Vec<ValueType>,
}

impl ParamDef {
    pub fn any(name: impl Into<String>) -> Self {
        ParamDef {
            name: name.into(),
            accepts: Vec::new(),
        }
    }

    pub fn typed(name: impl Into<String>, accepts: Vec<ValueType>) -> Self {
        ParamDef {
            name: name.into(),
            accepts,
        }
    }

    pub fn is_constrained(&self) -> bool {
        !self.accepts.is_empty()
    }

    pub fn admits(&self, value: &Value) -> bool {
        !self.is_constrained() || self.accepts.iter().any(|t| t.accepts(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// Method name; also the function name looked up in the namespace.
    pub name: String,
    /// Alias of the namespace holding the function; `None` means `core`.
    pub namespace: Option<String>,
    pub params: Vec<ParamDef>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDef {
            name: name.into(),
            namespace: None,
            params: Vec::new(),
        }
    }

    /// Tag the method with a namespace alias.
    pub fn ns(mut self, alias: impl Into<String>) -> Self {
        self.namespace = Some(alias.into());
        self
    }

    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceDef {
    pub name: String,
    /// Alias declarations, `"text :as s"`.
    pub requires: Vec<String>,
    pub methods: HashMap<String, MethodDef>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceDef {
            name: name.into(),
            requires: Vec::new(),
            methods: HashMap::new(),
        }
    }

    pub fn require(mut self, declaration: impl Into<String>) -> Self {
        self.requires.push(declaration.into());
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn get_method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.get(name)
    }
}

/// A host type whose methods are served by foreign functions.
///
/// ```
/// use nsbridge::runner::binding::{ForeignInterface, InterfaceDef, MethodDef, ParamDef, Proxy};
/// use nsbridge::runner::ds::error::Result;
/// use nsbridge::runner::ds::value::{Value, ValueType};
///
/// struct Text(Proxy);
///
/// impl ForeignInterface for Text {
///     fn interface() -> InterfaceDef {
///         InterfaceDef::new("Text")
///             .require("text :as s")
///             .method(
///                 MethodDef::new("upper-case")
///                     .ns("s")
///                     .param(ParamDef::typed("s", vec![ValueType::String])),
///             )
///     }
///
///     fn bind(proxy: Proxy) -> Self {
///         Text(proxy)
///     }
/// }
///
/// impl Text {
///     fn upper_case(&self, s: &str) -> Result<String> {
///         self.0.call_as("upper-case", vec![Value::string(s)])
///     }
/// }
/// ```
pub trait ForeignInterface: Sized {
    fn interface() -> InterfaceDef;
    fn bind(proxy: Proxy) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_param_admits_anything() {
        let p = ParamDef::any("x");
        assert!(p.admits(&Value::Nil));
        assert!(p.admits(&Value::Bytes(vec![])));
    }

    #[test]
    fn test_constrained_param() {
        let p = ParamDef::typed("match", vec![ValueType::String, ValueType::Char]);
        assert!(p.admits(&Value::string("C")));
        assert!(p.admits(&Value::Char('C')));
        assert!(!p.admits(&Value::Bytes(b"C".to_vec())));
    }
}

use std::fmt;

/// A possibly namespace-qualified name, `ns/name` or bare `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    namespace: Option<String>,
    name: String,
}

impl Symbol {
    /// Split on the first `/`. A lone `/` is the unqualified name `/`.
    pub fn parse(text: &str) -> Self {
        match text.find('/') {
            Some(idx) if idx > 0 && idx + 1 < text.len() => Symbol {
                namespace: Some(text[..idx].to_string()),
                name: text[idx + 1..].to_string(),
            },
            _ => Symbol {
                namespace: None,
                name: text.to_string(),
            },
        }
    }

    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Symbol {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualify an unqualified symbol with `namespace`; qualified ones are kept.
    pub fn with_default_namespace(self, namespace: &str) -> Self {
        match self.namespace {
            Some(_) => self,
            None => Symbol::qualified(namespace, self.name),
        }
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::parse(text)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

//! The reference foreign runtime.
//!
//! A realm is a table of namespaces, each a table of vars. Only `core` exists
//! at creation; everything else is pulled in by `require` (first use) or
//! `load` (forced) from the realm's loader root, the calling thread's context
//! loader or the realm's own sources, in that order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::runner::api::RuntimeAccess;
use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::execution_context::context_loader;
use crate::runner::ds::loader::ModuleLoader;
use crate::runner::ds::symbol::Symbol;
use crate::runner::ds::value::Value;
use crate::runner::eval::dispatch::invoke_value;
use crate::runner::plugin::core_resolver::RegistrySource;
use crate::runner::plugin::resolver::NamespaceSource;
use crate::runner::plugin::super_global::NamespaceTable;
use crate::runner::plugin::types::NamespaceDef;
use crate::runner::std_lib;

/// Namespace used for unqualified names.
pub const DEFAULT_NAMESPACE: &str = "core";

thread_local! {
    static DYNAMIC_BINDINGS: RefCell<HashMap<Uuid, HashMap<String, Value>>> =
        RefCell::new(HashMap::new());
}

/// Per-thread values of a realm's dynamic vars.
///
/// Every thread sees only its own bindings. Two realms never share a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicBindingStore {
    realm: Uuid,
}

impl DynamicBindingStore {
    pub fn get(&self, qualified: &str) -> Option<Value> {
        DYNAMIC_BINDINGS.with(|cell| {
            cell.borrow()
                .get(&self.realm)
                .and_then(|vars| vars.get(qualified))
                .cloned()
        })
    }

    pub fn set(&self, qualified: &str, value: Value) {
        DYNAMIC_BINDINGS.with(|cell| {
            cell.borrow_mut()
                .entry(self.realm)
                .or_insert_with(HashMap::new)
                .insert(qualified.to_string(), value);
        })
    }

    /// Drop every binding this thread holds for the realm.
    pub fn clear(&self) {
        DYNAMIC_BINDINGS.with(|cell| {
            cell.borrow_mut().remove(&self.realm);
        })
    }

    pub fn is_empty(&self) -> bool {
        DYNAMIC_BINDINGS.with(|cell| {
            cell.borrow()
                .get(&self.realm)
                .map(|vars| vars.is_empty())
                .unwrap_or(true)
        })
    }
}

pub struct Realm {
    id: Uuid,
    name: String,
    default_namespace: String,
    namespaces: RwLock<HashMap<String, NamespaceDef>>,
    sources: RwLock<NamespaceTable>,
    loader_root: RwLock<Option<Arc<ModuleLoader>>>,
    shut_down: AtomicBool,
}

impl Realm {
    /// A realm with `core` interned and the standard namespaces available.
    pub fn new() -> Arc<Realm> {
        Realm::with_name("default")
    }

    pub fn with_name(name: &str) -> Arc<Realm> {
        let realm = Realm::bare(name);
        realm.add_source(Arc::new(RegistrySource::std()));
        realm
    }

    /// Like [`with_name`](Self::with_name), resolving unqualified names in
    /// `namespace` instead of `core`.
    pub fn with_default_namespace(name: &str, namespace: &str) -> Arc<Realm> {
        let realm = Realm::build(name, namespace);
        realm.add_source(Arc::new(RegistrySource::std()));
        realm
    }

    /// A realm with only `core`.
    pub fn bare(name: &str) -> Arc<Realm> {
        Realm::build(name, DEFAULT_NAMESPACE)
    }

    fn build(name: &str, default_namespace: &str) -> Arc<Realm> {
        Arc::new_cyclic(|weak: &Weak<Realm>| {
            let core_ns = std_lib::core::namespace(weak.clone());
            let mut namespaces = HashMap::new();
            namespaces.insert(core_ns.name.clone(), core_ns);
            Realm {
                id: Uuid::new_v4(),
                name: name.to_string(),
                default_namespace: default_namespace.to_string(),
                namespaces: RwLock::new(namespaces),
                sources: RwLock::new(NamespaceTable::new()),
                loader_root: RwLock::new(None),
                shut_down: AtomicBool::new(false),
            }
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_source(&self, source: Arc<dyn NamespaceSource>) {
        self.sources.write().add_source(source);
    }

    pub fn bindings(&self) -> DynamicBindingStore {
        DynamicBindingStore { realm: self.id }
    }

    pub fn loader_root(&self) -> Option<Arc<ModuleLoader>> {
        self.loader_root.read().clone()
    }

    /// Bind the loader consulted first for every namespace lookup.
    pub fn set_loader_root(&self, loader: Option<Arc<ModuleLoader>>) {
        *self.loader_root.write() = loader;
    }

    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.namespaces.read().contains_key(namespace)
    }

    pub fn namespace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn find_definition(&self, namespace: &str) -> Result<Option<NamespaceDef>> {
        if let Some(root) = self.loader_root() {
            if let Some(def) = root.find_source(namespace)? {
                return Ok(Some(def));
            }
        }
        if let Some(loader) = context_loader() {
            if let Some(def) = loader.find_source(namespace)? {
                return Ok(Some(def));
            }
        }
        self.sources.read().find(namespace)
    }

    fn install(&self, namespace: &str, def: NamespaceDef) {
        let mut namespaces = self.namespaces.write();
        match namespaces.get_mut(namespace) {
            Some(existing) => {
                existing.vars.extend(def.vars);
                existing.dynamic.extend(def.dynamic);
            }
            None => {
                namespaces.insert(namespace.to_string(), def);
            }
        }
    }

    /// Load `namespace` unless it is already loaded.
    pub fn require(&self, namespace: &str) -> Result<()> {
        if self.is_loaded(namespace) {
            return Ok(());
        }
        self.load_namespace(namespace)
    }

    /// Load a package by path (`a/b` names namespace `a.b`), even if loaded before.
    pub fn load(&self, path: &str) -> Result<()> {
        let namespace = path.trim_start_matches('/').replace('/', ".");
        self.load_namespace(&namespace)
    }

    fn load_namespace(&self, namespace: &str) -> Result<()> {
        let def = self
            .find_definition(namespace)?
            .ok_or_else(|| BridgeError::NamespaceNotFound {
                namespace: namespace.to_string(),
            })?;
        debug!(realm = %self.name, namespace, vars = def.vars.len(), "namespace loaded");
        self.install(namespace, def);
        Ok(())
    }

    /// Current value of a var, honoring this thread's dynamic bindings.
    /// `None` if the namespace is not loaded or has no such var.
    pub fn resolve(&self, symbol: &Symbol) -> Option<Value> {
        let namespace = symbol.namespace().unwrap_or(self.default_namespace.as_str());
        let namespaces = self.namespaces.read();
        let def = namespaces.get(namespace)?;
        let root = def.vars.get(symbol.name())?;
        if def.dynamic.contains(symbol.name()) {
            let qualified = format!("{}/{}", namespace, symbol.name());
            if let Some(bound) = self.bindings().get(&qualified) {
                return Some(bound);
            }
        }
        Some(root.clone())
    }

    /// Resolve, requiring the namespace first when it is not loaded yet.
    pub fn var(&self, symbol: &Symbol) -> Result<Value> {
        trace!(realm = %self.name, symbol = %symbol, "var");
        if let Some(value) = self.resolve(symbol) {
            return Ok(value);
        }
        let namespace = symbol.namespace().unwrap_or(self.default_namespace.as_str());
        if !self.is_loaded(namespace) {
            match self.require(namespace) {
                Ok(()) => {}
                Err(BridgeError::NamespaceNotFound { .. }) => {
                    return Err(BridgeError::unresolved(symbol.to_string()))
                }
                Err(e) => return Err(e),
            }
            if let Some(value) = self.resolve(symbol) {
                return Ok(value);
            }
        }
        Err(BridgeError::unresolved(symbol.to_string()))
    }

    /// Define or replace a var's root value, creating the namespace if needed.
    pub fn intern(&self, namespace: &str, name: &str, value: Value) {
        let mut namespaces = self.namespaces.write();
        namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| NamespaceDef::new(namespace))
            .vars
            .insert(name.to_string(), value);
    }

    /// Set this thread's binding of a dynamic var.
    pub fn set_dynamic(&self, symbol: &Symbol, value: Value) -> Result<()> {
        let namespace = symbol.namespace().unwrap_or(self.default_namespace.as_str());
        let is_dynamic = {
            let namespaces = self.namespaces.read();
            let def = namespaces
                .get(namespace)
                .filter(|def| def.has_var(symbol.name()))
                .ok_or_else(|| BridgeError::unresolved(symbol.to_string()))?;
            def.dynamic.contains(symbol.name())
        };
        if !is_dynamic {
            return Err(BridgeError::foreign(
                "core/set!",
                format!("can't change root binding of {} with set!", symbol),
            ));
        }
        self.bindings()
            .set(&format!("{}/{}", namespace, symbol.name()), value);
        Ok(())
    }

    /// Stop the realm. Idempotent.
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            debug!(realm = %self.name, id = %self.id.to_hyphenated(), "realm shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl RuntimeAccess for Realm {
    fn var(&self, symbol: &Symbol) -> Result<Value> {
        Realm::var(self, symbol)
    }

    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        invoke_value(callee, args)
    }

    fn load(&self, path: &str) -> Result<()> {
        Realm::load(self, path)
    }

    fn default_namespace(&self) -> &str {
        &self.default_namespace
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Realm({}, {})", self.name, self.id.to_hyphenated())
    }
}

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::runner::api::RuntimeAccess;
use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::function_object::ForeignFn;
use crate::runner::ds::loader::ModuleLoader;
use crate::runner::ds::realm::{DynamicBindingStore, Realm, DEFAULT_NAMESPACE};
use crate::runner::ds::symbol::Symbol;
use crate::runner::ds::value::Value;
use crate::runner::eval::dispatch::{dispatch, invoke_value};

use super::bracket::{self, CallBracket};

/// Lifecycle of a [`RuntimeHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Uninitialized,
    Initializing,
    Ready,
    Closed,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Uninitialized => "uninitialized",
            InstanceState::Initializing => "initializing",
            InstanceState::Ready => "ready",
            InstanceState::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// Everything a ready handle calls through.
pub(super) struct HandleInner {
    pub(super) loader: Arc<ModuleLoader>,
    pub(super) realm: Arc<Realm>,
    pub(super) store: DynamicBindingStore,
    require: ForeignFn,
    resolve: ForeignFn,
}

/// A private realm bound to one module loader.
///
/// Every call made through the handle runs inside a [`CallBracket`]: the
/// thread's context loader is switched to the module's for the duration of
/// the call, and the thread's dynamic bindings in the private realm are
/// dropped when its outermost call returns.
pub struct RuntimeHandle {
    id: Uuid,
    module: RwLock<Option<String>>,
    state: RwLock<InstanceState>,
    inner: RwLock<Option<Arc<HandleInner>>>,
    /// Threads currently inside at least one bracket.
    active: AtomicUsize,
    released: AtomicBool,
}

impl RuntimeHandle {
    pub fn new() -> Self {
        RuntimeHandle {
            id: Uuid::new_v4(),
            module: RwLock::new(None),
            state: RwLock::new(InstanceState::Uninitialized),
            inner: RwLock::new(None),
            active: AtomicUsize::new(0),
            released: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> InstanceState {
        *self.state.read()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == InstanceState::Ready
    }

    /// Name of the module this handle was initialized for.
    pub fn module_name(&self) -> Option<String> {
        self.module.read().clone()
    }

    /// The private realm, while the handle holds one.
    pub fn realm(&self) -> Option<Arc<Realm>> {
        self.inner.read().as_ref().map(|inner| inner.realm.clone())
    }

    /// Nesting depth of this thread's calls into the handle.
    pub fn call_depth(&self) -> usize {
        bracket::depth(self.id)
    }

    /// Number of threads currently inside a call.
    pub fn active_threads(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Create the module's private realm and bind it to `loader`.
    pub fn initialize(&self, loader: Arc<ModuleLoader>) -> Result<()> {
        let realm = Realm::with_name(loader.name());
        self.initialize_with(loader, realm)
    }

    /// Like [`initialize`](Self::initialize), with a caller-supplied realm.
    pub fn initialize_with(&self, loader: Arc<ModuleLoader>, realm: Arc<Realm>) -> Result<()> {
        {
            let mut state = self.state.write();
            match *state {
                InstanceState::Uninitialized => *state = InstanceState::Initializing,
                InstanceState::Closed => {
                    return Err(BridgeError::InstanceClosed {
                        module: loader.name().to_string(),
                    })
                }
                other => {
                    return Err(BridgeError::IsolationInit {
                        module: loader.name().to_string(),
                        reason: format!("handle is already {}", other),
                    })
                }
            }
        }

        *self.module.write() = Some(loader.name().to_string());
        match bind(loader, realm) {
            Ok(inner) => {
                debug!(
                    handle = %self.id.to_hyphenated(),
                    module = inner.loader.name(),
                    realm = %inner.realm.id().to_hyphenated(),
                    "runtime handle ready"
                );
                *self.inner.write() = Some(Arc::new(inner));
                *self.state.write() = InstanceState::Ready;
                Ok(())
            }
            Err(e) => {
                *self.state.write() = InstanceState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Enter a call bracket, failing unless the handle is ready.
    pub fn enter(&self) -> Result<CallBracket<'_>> {
        let state = self.state.read();
        match *state {
            InstanceState::Ready => {}
            InstanceState::Closed => {
                return Err(BridgeError::InstanceClosed {
                    module: self.module_name().unwrap_or_default(),
                })
            }
            other => {
                return Err(BridgeError::InstanceNotReady {
                    state: other.to_string(),
                })
            }
        }
        let inner = self
            .inner
            .read()
            .clone()
            .ok_or_else(|| BridgeError::InstanceNotReady {
                state: state.to_string(),
            })?;
        let first = bracket::increment(self.id) == 1;
        if first {
            self.active.fetch_add(1, Ordering::SeqCst);
        }
        Ok(CallBracket::new(self, inner))
    }

    /// Called by the outermost bracket of a thread on exit.
    pub(super) fn thread_left(&self, inner: &HandleInner) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 && self.state() == InstanceState::Closed {
            if let Err(e) = self.release(inner) {
                warn!(handle = %self.id.to_hyphenated(), error = %e, "deferred release failed");
            }
        }
    }

    /// Stop accepting calls. The realm is shut down now if no thread is
    /// inside a call, otherwise by the last thread to leave.
    pub fn close(&self) -> Result<()> {
        let idle = {
            let mut state = self.state.write();
            if *state == InstanceState::Closed {
                return Ok(());
            }
            *state = InstanceState::Closed;
            self.active.load(Ordering::SeqCst) == 0
        };
        let inner = self.inner.read().clone();
        match inner {
            Some(inner) if idle => self.release(&inner),
            Some(inner) => {
                warn!(
                    handle = %self.id.to_hyphenated(),
                    module = inner.loader.name(),
                    active = self.active_threads(),
                    "closed while calls are in flight; release deferred"
                );
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn release(&self, inner: &HandleInner) -> Result<()> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!(handle = %self.id.to_hyphenated(), module = inner.loader.name(), "releasing realm");
        let shutdown = inner
            .realm
            .var(&Symbol::qualified(DEFAULT_NAMESPACE, "shutdown-agents"));
        let result = shutdown.and_then(|f| invoke_value(&f, Vec::new())).map(|_| ());
        inner.realm.set_loader_root(None);
        *self.inner.write() = None;
        result
    }
}

impl Default for RuntimeHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeHandle({}, {})", self.id.to_hyphenated(), self.state())
    }
}

fn bind(loader: Arc<ModuleLoader>, realm: Arc<Realm>) -> Result<HandleInner> {
    let require = core_fn(&loader, &realm, "require")?;
    let resolve = core_fn(&loader, &realm, "resolve")?;
    realm.set_loader_root(Some(loader.clone()));
    Ok(HandleInner {
        store: realm.bindings(),
        loader,
        realm,
        require,
        resolve,
    })
}

fn core_fn(loader: &ModuleLoader, realm: &Realm, name: &str) -> Result<ForeignFn> {
    match realm.resolve(&Symbol::qualified(DEFAULT_NAMESPACE, name)) {
        Some(Value::Function(f)) => Ok(f),
        Some(other) => Err(BridgeError::IsolationInit {
            module: loader.name().to_string(),
            reason: format!("{}/{} is a {}, not a function", DEFAULT_NAMESPACE, name, other.value_type()),
        }),
        None => Err(BridgeError::IsolationInit {
            module: loader.name().to_string(),
            reason: format!("{}/{} is missing", DEFAULT_NAMESPACE, name),
        }),
    }
}

impl RuntimeAccess for RuntimeHandle {
    /// Resolve through the captured `resolve`, requiring the namespace on a miss.
    fn var(&self, symbol: &Symbol) -> Result<Value> {
        let bracket = self.enter()?;
        let inner = bracket.inner();
        let namespace = symbol.namespace().unwrap_or(DEFAULT_NAMESPACE);
        let qualified = Symbol::qualified(namespace, symbol.name());

        let found = dispatch(&inner.resolve, vec![Value::string(qualified.to_string())])?;
        if !found.is_nil() {
            return Ok(found);
        }
        match dispatch(&inner.require, vec![Value::string(namespace)]) {
            Ok(_) => {}
            Err(BridgeError::NamespaceNotFound { .. }) => {
                return Err(BridgeError::unresolved(symbol.to_string()))
            }
            Err(e) => return Err(e),
        }
        inner.realm.var(&qualified)
    }

    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        let _bracket = self.enter()?;
        invoke_value(callee, args)
    }

    fn load(&self, path: &str) -> Result<()> {
        let bracket = self.enter()?;
        bracket.inner().realm.load(path)
    }

    fn run_scoped(&self, body: &mut dyn FnMut() -> Result<Value>) -> Result<Value> {
        let _bracket = self.enter()?;
        body()
    }
}

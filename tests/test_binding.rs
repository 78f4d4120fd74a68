extern crate nsbridge;

use nsbridge::runner::api::{Bridge, RuntimeAccess};
use nsbridge::runner::binding::{ForeignInterface, InterfaceDef, MethodDef, ParamDef, Proxy};
use nsbridge::runner::ds::error::{BridgeError, Result};
use nsbridge::runner::ds::function_object::{Arity, ForeignFn};
use nsbridge::runner::ds::loader::ModuleLoader;
use nsbridge::runner::ds::realm::Realm;
use nsbridge::runner::ds::symbol::Symbol;
use nsbridge::runner::ds::value::{Value, ValueType};
use nsbridge::runner::isolation::RuntimeHandle;
use nsbridge::runner::std_lib::OutputBuffer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Runtime wrapper counting var lookups and loads
struct CountingRuntime {
    realm: Arc<Realm>,
    lookups: AtomicUsize,
    loads: AtomicUsize,
}

impl CountingRuntime {
    fn new() -> Arc<Self> {
        Arc::new(CountingRuntime {
            realm: Realm::new(),
            lookups: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
        })
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl RuntimeAccess for CountingRuntime {
    fn var(&self, symbol: &Symbol) -> Result<Value> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        RuntimeAccess::var(self.realm.as_ref(), symbol)
    }

    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        RuntimeAccess::invoke(self.realm.as_ref(), callee, args)
    }

    fn load(&self, path: &str) -> Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        RuntimeAccess::load(self.realm.as_ref(), path)
    }
}

fn text_interface() -> InterfaceDef {
    let pattern = vec![ValueType::String, ValueType::Char];
    InterfaceDef::new("Text")
        .require("text :as s")
        .method(
            MethodDef::new("replace")
                .ns("s")
                .param(ParamDef::typed("s", vec![ValueType::String]))
                .param(ParamDef::typed("match", pattern.clone()))
                .param(ParamDef::typed("replacement", pattern)),
        )
        .method(
            MethodDef::new("upper-case")
                .ns("s")
                .param(ParamDef::typed("s", vec![ValueType::String])),
        )
        .method(MethodDef::new("str").param(ParamDef::any("a")).param(ParamDef::any("b")))
        .method(MethodDef::new("trim").ns("t").param(ParamDef::any("s")))
}

fn text_proxy(runtime: Arc<CountingRuntime>) -> Proxy {
    Proxy::new(Arc::new(text_interface()), runtime, vec![]).unwrap()
}

fn s(text: &str) -> Value {
    Value::string(text)
}

#[test]
fn test_alias_maps_to_namespace() {
    let proxy = text_proxy(CountingRuntime::new());
    assert_eq!(proxy.aliases().lookup("s"), Some("text"));
    assert_eq!(proxy.aliases().lookup("t"), None);
}

#[test]
fn test_call_resolves_once() {
    let runtime = CountingRuntime::new();
    let proxy = text_proxy(runtime.clone());
    assert!(!proxy.is_bound("replace"));

    let first = proxy
        .call("replace", vec![s("I see because I see"), s("see"), s("C")])
        .unwrap();
    assert_eq!(first, s("I C because I C"));
    assert!(proxy.is_bound("replace"));
    assert_eq!(runtime.lookups(), 1);

    let second = proxy
        .call("replace", vec![s("see"), Value::Char('s'), Value::Char('z')])
        .unwrap();
    assert_eq!(second, s("zee"));
    assert_eq!(runtime.lookups(), 1);
}

#[test]
fn test_type_constraint_violation_names_index() {
    let proxy = text_proxy(CountingRuntime::new());
    match proxy.call("replace", vec![s("I see"), Value::Bytes(b"see".to_vec()), s("C")]) {
        Err(BridgeError::TypeConstraintViolation {
            method,
            index,
            actual,
            expected,
        }) => {
            assert_eq!(method, "replace");
            assert_eq!(index, 1);
            assert_eq!(actual, ValueType::Bytes);
            assert_eq!(expected, vec![ValueType::String, ValueType::Char]);
        }
        other => panic!("expected TypeConstraintViolation, got {:?}", other),
    }
}

#[test]
fn test_violation_message_lists_allowed_types() {
    let proxy = text_proxy(CountingRuntime::new());
    let err = proxy
        .call("upper-case", vec![Value::Integer(3)])
        .unwrap_err()
        .to_string();
    assert!(err.contains("upper-case"), "{}", err);
    assert!(err.contains("argument 0"), "{}", err);
}

#[test]
fn test_untagged_method_resolves_in_core() {
    let proxy = text_proxy(CountingRuntime::new());
    assert_eq!(proxy.call("str", vec![s("a"), Value::Integer(1)]).unwrap(), s("a1"));
}

#[test]
fn test_wrong_argument_count() {
    let proxy = text_proxy(CountingRuntime::new());
    assert!(matches!(
        proxy.call("upper-case", vec![s("a"), s("b")]),
        Err(BridgeError::ArityMismatch { .. })
    ));
}

#[test]
fn test_unaliased_tag_is_unresolved() {
    let proxy = text_proxy(CountingRuntime::new());
    match proxy.call("trim", vec![s(" x ")]) {
        Err(BridgeError::UnresolvedReference { name }) => {
            assert!(name.contains("not aliased"), "{}", name)
        }
        other => panic!("expected UnresolvedReference, got {:?}", other),
    }
}

#[test]
fn test_unknown_method() {
    let proxy = text_proxy(CountingRuntime::new());
    match proxy.call("nope", vec![]) {
        Err(BridgeError::UnresolvedReference { name }) => assert_eq!(name, "Text.nope"),
        other => panic!("expected UnresolvedReference, got {:?}", other),
    }
}

#[test]
fn test_return_type_conversion() {
    let proxy = text_proxy(CountingRuntime::new());
    let upper: String = proxy.call_as("upper-case", vec![s("abc")]).unwrap();
    assert_eq!(upper, "ABC");
    match proxy.call_as::<i64>("upper-case", vec![s("abc")]) {
        Err(BridgeError::ReturnType { expected, actual, .. }) => {
            assert_eq!(expected, "integer");
            assert_eq!(actual, ValueType::String);
        }
        other => panic!("expected ReturnType, got {:?}", other),
    }
}

#[test]
fn test_malformed_interface_alias() {
    let def = InterfaceDef::new("Bad").require("text s");
    assert!(matches!(
        Proxy::new(Arc::new(def), CountingRuntime::new(), vec![]),
        Err(BridgeError::MalformedAlias { .. })
    ));
}

#[test]
fn test_preload_runs_once_before_first_call() {
    let runtime = CountingRuntime::new();
    let proxy = Proxy::new(Arc::new(text_interface()), runtime.clone(), vec!["io".to_string()]).unwrap();
    assert_eq!(runtime.loads(), 0);
    proxy.call("upper-case", vec![s("a")]).unwrap();
    proxy.call("upper-case", vec![s("b")]).unwrap();
    assert_eq!(runtime.loads(), 1);
    assert!(runtime.realm.is_loaded("io"));
}

fn greet_a(_args: &[Value]) -> Result<Value> {
    Ok(s("a"))
}

fn greet_b(_args: &[Value]) -> Result<Value> {
    Ok(s("b"))
}

#[test]
fn test_bound_method_keeps_first_resolution() {
    let runtime = CountingRuntime::new();
    runtime.realm.intern(
        "core",
        "greet",
        Value::Function(ForeignFn::native("core/greet", Arity::Exact(0), greet_a)),
    );
    let def = InterfaceDef::new("Greeter").method(MethodDef::new("greet"));
    let proxy = Proxy::new(Arc::new(def), runtime.clone(), vec![]).unwrap();
    assert_eq!(proxy.call("greet", vec![]).unwrap(), s("a"));

    runtime.realm.intern(
        "core",
        "greet",
        Value::Function(ForeignFn::native("core/greet", Arity::Exact(0), greet_b)),
    );
    assert_eq!(proxy.call("greet", vec![]).unwrap(), s("a"));
}

fn settings(_args: &[Value]) -> Result<Value> {
    Ok(Value::Map(vec![
        (Value::Keyword("mode".to_string()), s("fast")),
        (Value::Keyword("depth".to_string()), Value::Integer(3)),
    ]))
}

#[test]
fn test_map_result_converts_to_named_entries() {
    let runtime = CountingRuntime::new();
    runtime.realm.intern(
        "core",
        "settings",
        Value::Function(ForeignFn::native("core/settings", Arity::Exact(0), settings)),
    );
    let def = InterfaceDef::new("Settings").method(MethodDef::new("settings"));
    let proxy = Proxy::new(Arc::new(def), runtime, vec![]).unwrap();

    let named: HashMap<String, Value> = proxy.call_as("settings", vec![]).unwrap();
    assert_eq!(named.get("mode"), Some(&s("fast")));
    assert_eq!(named.get("depth"), Some(&Value::Integer(3)));

    let pairs: Vec<(Value, Value)> = proxy.call_as("settings", vec![]).unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(matches!(
        proxy.call_as::<String>("settings", vec![]),
        Err(BridgeError::ReturnType { .. })
    ));
}

// ── ForeignInterface ─────────────────────────────────────────────────

struct Text(Proxy);

impl ForeignInterface for Text {
    fn interface() -> InterfaceDef {
        text_interface()
    }

    fn bind(proxy: Proxy) -> Self {
        Text(proxy)
    }
}

impl Text {
    fn replace(&self, s: &str, m: &str, r: &str) -> Result<String> {
        self.0.call_as("replace", vec![Value::string(s), Value::string(m), Value::string(r)])
    }
}

struct Io(Proxy);

impl ForeignInterface for Io {
    fn interface() -> InterfaceDef {
        InterfaceDef::new("Io").require("io :as io").method(
            MethodDef::new("copy")
                .ns("io")
                .param(ParamDef::typed("input", vec![ValueType::String, ValueType::Bytes]))
                .param(ParamDef::typed("output", vec![OutputBuffer::value_type()])),
        )
    }

    fn bind(proxy: Proxy) -> Self {
        Io(proxy)
    }
}

impl Io {
    fn copy(&self, input: &str, output: &OutputBuffer) -> Result<()> {
        self.0.call_as("copy", vec![Value::string(input), output.to_value()])
    }
}

#[test]
fn test_define_through_bridge() {
    let bridge = Bridge::shared(Realm::new());
    let text: Text = bridge.define(&[]).unwrap();
    let io: Io = bridge.define(&[]).unwrap();

    let replaced = text.replace("I see because I see", "see", "C").unwrap();
    let out = OutputBuffer::new();
    io.copy(&replaced, &out).unwrap();
    assert_eq!(out.contents(), "I C because I C");
}

#[test]
fn test_opaque_constraint_rejects_other_values() {
    let io: Io = Bridge::shared(Realm::new()).define(&[]).unwrap();
    match io.0.call("copy", vec![s("x"), s("not a buffer")]) {
        Err(BridgeError::TypeConstraintViolation { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected TypeConstraintViolation, got {:?}", other),
    }
}

#[test]
fn test_define_on_isolated_runtime() {
    let handle = Arc::new(RuntimeHandle::new());
    handle.initialize(Arc::new(ModuleLoader::new("binding"))).unwrap();
    let text: Text = Bridge::isolated(handle.clone()).define(&[]).unwrap();
    assert_eq!(text.replace("abc", "b", "-").unwrap(), "a-c");

    handle.close().unwrap();
    assert!(matches!(
        text.replace("abc", "b", "-"),
        Err(BridgeError::InstanceClosed { .. })
    ));
}

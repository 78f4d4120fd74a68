//! End-to-end tests: scripts, configuration and the global bridge.

extern crate nsbridge;

use nsbridge::runner::api::{let_block, literal, Bridge};
use nsbridge::runner::ds::error::BridgeError;
use nsbridge::runner::ds::realm::Realm;
use nsbridge::runner::ds::value::Value;
use nsbridge::runner::plugin::config::BridgeConfig;
use nsbridge::runner::std_lib::OutputBuffer;
use nsbridge::{call, vars};

const REPLACE_SCRIPT: &str = r#"
(require "text :as s")
(s/replace "I see because I see" "see" "C")
"#;

/// Helper to run a script against a fresh realm
fn run(script: &str) -> Result<Value, BridgeError> {
    Bridge::shared(Realm::new()).run_script(script)
}

#[test]
fn test_replace_script() {
    assert_eq!(run(REPLACE_SCRIPT).unwrap(), Value::string("I C because I C"));
}

#[test]
fn test_copy_into_host_buffer_with_let_shadowing() {
    let out = OutputBuffer::new();
    let block = [let_block(
        vars!(
            "input" => "I see because I see",
            "output" => out.to_value(),
        ),
        vec![let_block(
            vars!("input" => call!("s/replace", "input", Value::string("see"), Value::string("C"))),
            vec![call!("io/copy", "input", "output")],
        )],
    )];
    Bridge::shared(Realm::new())
        .do_all(&["text :as s", "io :as io"], &block)
        .unwrap();
    assert_eq!(out.contents(), "I C because I C");
}

#[test]
fn test_copy_roundtrips_input() {
    let input = "the quick brown fox";
    let out = OutputBuffer::new();
    Bridge::shared(Realm::new())
        .do_all(
            &["io :as io"],
            &[call!("io/copy", Value::string(input), out.to_value())],
        )
        .unwrap();
    assert_eq!(out.contents(), input);
}

#[test]
fn test_let_script() {
    let script = r#"
        (require "text :as s")
        (let [x "hello" y (s/upper-case x)]
          (str x " " y))
    "#;
    assert_eq!(run(script).unwrap(), Value::string("hello HELLO"));
}

#[test]
fn test_script_literal_and_values() {
    let script = r#"
        (count [1 2 3])
        (fn str)
    "#;
    match run(script).unwrap() {
        Value::Function(f) => assert_eq!(f.name(), "core/str"),
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_script_numbers() {
    assert_eq!(run("(+ 1 2 3)").unwrap(), Value::Integer(6));
    assert_eq!(run("(+ 1 2.5)").unwrap(), Value::Float(3.5));
    assert_eq!(run("(= :a :a)").unwrap(), Value::Boolean(true));
}

#[test]
fn test_script_errors() {
    assert!(matches!(run("(str"), Err(BridgeError::Parse(_))));
    assert!(matches!(run("(let [x] x)"), Err(BridgeError::OddBindingForms { count: 1 })));
    assert!(matches!(
        run("(let [x 1 x 2] x)"),
        Err(BridgeError::DuplicateBinding { .. })
    ));
    assert!(matches!(
        run("(s/trim \" x \")"),
        Err(BridgeError::UnresolvedReference { .. })
    ));
}

#[test]
fn test_global_bridge_is_shared() {
    let a = Bridge::global();
    let b = Bridge::global();
    let f = a.var("core/str").unwrap();
    assert_eq!(f, b.var("core/str").unwrap());
    assert_eq!(a.run_script(REPLACE_SCRIPT).unwrap(), Value::string("I C because I C"));
}

#[test]
fn test_config_applies_requires_and_preload() {
    let config = BridgeConfig::parse(
        r#"{
            "requires": ["text :as s"],
            "preload": ["io"]
        }"#,
    )
    .unwrap();
    let bridge = Bridge::from_config(&config).unwrap();
    assert_eq!(bridge.requires(), &["text :as s".to_string()]);
    assert_eq!(
        bridge.run_script(r#"(s/upper-case "abc")"#).unwrap(),
        Value::string("ABC")
    );
}

#[test]
fn test_config_default_namespace() {
    let config = BridgeConfig::parse(r#"{ "default_namespace": "text" }"#).unwrap();
    let bridge = Bridge::from_config(&config).unwrap();
    assert_eq!(bridge.do_block(&[call!("trim", " x ")]).unwrap(), Value::string("x"));
}

#[test]
fn test_config_with_bad_alias_is_rejected() {
    let config = BridgeConfig::parse(r#"{ "requires": ["text"] }"#).unwrap();
    assert!(matches!(
        Bridge::from_config(&config),
        Err(BridgeError::MalformedAlias { .. })
    ));
}

#[test]
fn test_invoke_fn_with_literal_result() {
    let bridge = Bridge::shared(Realm::new());
    let f = bridge.do_all(&["text :as s"], &[literal("s/upper-case")]).unwrap();
    assert_eq!(
        bridge.invoke_fn(&f, vec![Value::string("x")]).unwrap(),
        Value::string("X")
    );
}

//! The `core` namespace.
//!
//! Interned into every realm at creation. The runtime functions (`require`,
//! `resolve`, `load`, `set!`, `var-get`, `shutdown-agents`) hold a weak
//! reference back to the realm they were created for.

use std::sync::{Arc, Weak};

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::function_object::Arity;
use crate::runner::ds::realm::{Realm, DEFAULT_NAMESPACE};
use crate::runner::ds::symbol::Symbol;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::NamespaceDef;

/// Build the `core` namespace for the realm behind `realm`.
pub fn namespace(realm: Weak<Realm>) -> NamespaceDef {
    let def = NamespaceDef::new(DEFAULT_NAMESPACE)
        .add_fn("str", Arity::any(), core_str)
        .add_fn("identity", Arity::Exact(1), core_identity)
        .add_fn("list", Arity::any(), core_list)
        .add_fn("count", Arity::Exact(1), core_count)
        .add_fn("+", Arity::any(), core_add)
        .add_fn("=", Arity::AtLeast(1), core_equals)
        .add_fn("nil?", Arity::Exact(1), core_is_nil)
        .add_dynamic("*context*", Value::Nil);

    let r = realm.clone();
    let def = def.add_closure("require", Arity::AtLeast(1), move |args| {
        let realm = upgrade(&r, "core/require")?;
        for arg in args {
            realm.require(name_arg("core/require", arg)?)?;
        }
        Ok(Value::Nil)
    });

    let r = realm.clone();
    let def = def.add_closure("resolve", Arity::Exact(1), move |args| {
        let realm = upgrade(&r, "core/resolve")?;
        let symbol = Symbol::parse(name_arg("core/resolve", &args[0])?);
        Ok(realm.resolve(&symbol).unwrap_or(Value::Nil))
    });

    let r = realm.clone();
    let def = def.add_closure("load", Arity::AtLeast(1), move |args| {
        let realm = upgrade(&r, "core/load")?;
        for arg in args {
            realm.load(name_arg("core/load", arg)?)?;
        }
        Ok(Value::Nil)
    });

    let r = realm.clone();
    let def = def.add_closure("set!", Arity::Exact(2), move |args| {
        let realm = upgrade(&r, "core/set!")?;
        let symbol = Symbol::parse(name_arg("core/set!", &args[0])?);
        realm.set_dynamic(&symbol, args[1].clone())?;
        Ok(args[1].clone())
    });

    let r = realm.clone();
    let def = def.add_closure("var-get", Arity::Exact(1), move |args| {
        let realm = upgrade(&r, "core/var-get")?;
        realm.var(&Symbol::parse(name_arg("core/var-get", &args[0])?))
    });

    def.add_closure("shutdown-agents", Arity::Exact(0), move |_args| {
        upgrade(&realm, "core/shutdown-agents")?.shutdown();
        Ok(Value::Nil)
    })
}

fn upgrade(realm: &Weak<Realm>, function: &str) -> Result<Arc<Realm>> {
    realm
        .upgrade()
        .ok_or_else(|| BridgeError::foreign(function, "realm has been dropped"))
}

fn name_arg<'a>(function: &str, arg: &'a Value) -> Result<&'a str> {
    arg.as_str().ok_or_else(|| {
        BridgeError::foreign(
            function,
            format!("expected a name, got {}", arg.value_type()),
        )
    })
}

fn core_str(args: &[Value]) -> Result<Value> {
    Ok(Value::String(args.iter().map(Value::to_text).collect()))
}

fn core_identity(args: &[Value]) -> Result<Value> {
    Ok(args[0].clone())
}

fn core_list(args: &[Value]) -> Result<Value> {
    Ok(Value::List(args.to_vec()))
}

fn core_count(args: &[Value]) -> Result<Value> {
    let n = match &args[0] {
        Value::Nil => 0,
        Value::String(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::List(l) => l.len(),
        Value::Map(m) => m.len(),
        other => {
            return Err(BridgeError::foreign(
                "core/count",
                format!("count not supported on {}", other.value_type()),
            ))
        }
    };
    Ok(Value::Integer(n as i64))
}

fn core_add(args: &[Value]) -> Result<Value> {
    let mut int_sum: i64 = 0;
    let mut float_sum: Option<f64> = None;
    for arg in args {
        match arg {
            Value::Integer(i) => match float_sum.as_mut() {
                Some(f) => *f += *i as f64,
                None => {
                    int_sum = int_sum.checked_add(*i).ok_or_else(|| {
                        BridgeError::foreign("core/+", "integer overflow")
                    })?
                }
            },
            Value::Float(x) => {
                *float_sum.get_or_insert(int_sum as f64) += *x;
            }
            other => {
                return Err(BridgeError::foreign(
                    "core/+",
                    format!("cannot add {}", other.value_type()),
                ))
            }
        }
    }
    Ok(match float_sum {
        Some(f) => Value::Float(f),
        None => Value::Integer(int_sum),
    })
}

fn core_equals(args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(args.windows(2).all(|w| w[0] == w[1])))
}

fn core_is_nil(args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(args[0].is_nil()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_concatenates_text_forms() {
        let v = core_str(&[Value::string("a"), Value::Integer(1), Value::Nil, Value::Char('c')]).unwrap();
        assert_eq!(v, Value::string("a1c"));
    }

    #[test]
    fn test_add_promotes_to_float() {
        assert_eq!(core_add(&[]).unwrap(), Value::Integer(0));
        assert_eq!(
            core_add(&[Value::Integer(1), Value::Integer(2)]).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            core_add(&[Value::Integer(1), Value::Float(0.5), Value::Integer(1)]).unwrap(),
            Value::Float(2.5)
        );
        assert!(core_add(&[Value::string("x")]).is_err());
    }

    #[test]
    fn test_count() {
        assert_eq!(core_count(&[Value::string("héllo")]).unwrap(), Value::Integer(5));
        assert_eq!(core_count(&[Value::Nil]).unwrap(), Value::Integer(0));
        assert!(core_count(&[Value::Integer(3)]).is_err());
    }

    #[test]
    fn test_runtime_fns_fail_after_realm_dropped() {
        let def = namespace(Weak::new());
        let require = def.vars.get("require").and_then(Value::as_function).unwrap();
        assert!(matches!(
            require.apply(vec![Value::string("text")]),
            Err(BridgeError::Foreign { .. })
        ));
    }
}

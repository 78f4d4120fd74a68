//! The `text` namespace: string utilities.

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::function_object::Arity;
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::NamespaceRegistry;
use crate::runner::plugin::types::NamespaceDef;

/// Register the `text` namespace with the registry.
pub fn register(registry: &mut NamespaceRegistry) {
    let text = NamespaceDef::new("text")
        .add_fn("replace", Arity::Exact(3), text_replace)
        .add_fn("upper-case", Arity::Exact(1), text_upper_case)
        .add_fn("lower-case", Arity::Exact(1), text_lower_case)
        .add_fn("trim", Arity::Exact(1), text_trim)
        .add_fn("join", Arity::AtLeast(1), text_join)
        .add_fn("split", Arity::Exact(2), text_split)
        .add_fn("includes?", Arity::Exact(2), text_includes)
        .add_fn("blank?", Arity::Exact(1), text_blank);

    registry.register_namespace(text);
}

fn string_arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    match &args[index] {
        Value::String(s) => Ok(s),
        other => Err(BridgeError::foreign(
            format!("text/{}", function),
            format!("argument {} must be a string, got {}", index, other.value_type()),
        )),
    }
}

/// Pattern argument: a string or a single character.
fn pattern_arg(function: &str, args: &[Value], index: usize) -> Result<String> {
    match &args[index] {
        Value::Char(c) => Ok(c.to_string()),
        _ => string_arg(function, args, index).map(str::to_string),
    }
}

/// (replace s match replacement) replaces every occurrence of `match`.
fn text_replace(args: &[Value]) -> Result<Value> {
    let source = string_arg("replace", args, 0)?;
    let needle = pattern_arg("replace", args, 1)?;
    let replacement = pattern_arg("replace", args, 2)?;
    if needle.is_empty() {
        return Ok(Value::string(source));
    }
    Ok(Value::String(source.replace(&needle, &replacement)))
}

fn text_upper_case(args: &[Value]) -> Result<Value> {
    Ok(Value::String(string_arg("upper-case", args, 0)?.to_uppercase()))
}

fn text_lower_case(args: &[Value]) -> Result<Value> {
    Ok(Value::String(string_arg("lower-case", args, 0)?.to_lowercase()))
}

fn text_trim(args: &[Value]) -> Result<Value> {
    Ok(Value::string(string_arg("trim", args, 0)?.trim()))
}

/// (join coll) or (join separator coll)
fn text_join(args: &[Value]) -> Result<Value> {
    let (separator, coll) = match args {
        [coll] => (String::new(), coll),
        [_, coll] => (pattern_arg("join", args, 0)?, coll),
        _ => {
            return Err(BridgeError::ArityMismatch {
                function: "text/join".to_string(),
                expected: "1 or 2".to_string(),
                actual: args.len(),
            })
        }
    };
    match coll {
        Value::List(items) => Ok(Value::String(
            items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(&separator),
        )),
        Value::Nil => Ok(Value::string("")),
        other => Err(BridgeError::foreign(
            "text/join",
            format!("cannot join {}", other.value_type()),
        )),
    }
}

fn text_split(args: &[Value]) -> Result<Value> {
    let source = string_arg("split", args, 0)?;
    let separator = pattern_arg("split", args, 1)?;
    if separator.is_empty() {
        return Ok(Value::List(
            source.chars().map(|c| Value::String(c.to_string())).collect(),
        ));
    }
    Ok(Value::List(source.split(separator.as_str()).map(Value::string).collect()))
}

fn text_includes(args: &[Value]) -> Result<Value> {
    let source = string_arg("includes?", args, 0)?;
    let needle = pattern_arg("includes?", args, 1)?;
    Ok(Value::Boolean(source.contains(needle.as_str())))
}

/// True for nil, empty or whitespace-only strings.
fn text_blank(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Nil => Ok(Value::Boolean(true)),
        _ => Ok(Value::Boolean(
            string_arg("blank?", args, 0)?.trim().is_empty(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    #[test]
    fn test_replace_string_and_char() {
        assert_eq!(
            text_replace(&[s("I C because I C"), s("C"), s("see")]).unwrap(),
            s("I see because I see")
        );
        assert_eq!(
            text_replace(&[s("a-b-c"), Value::Char('-'), Value::Char('+')]).unwrap(),
            s("a+b+c")
        );
        assert!(matches!(
            text_replace(&[s("x"), Value::Bytes(vec![1]), s("y")]),
            Err(BridgeError::Foreign { .. })
        ));
    }

    #[test]
    fn test_join_and_split() {
        let parts = text_split(&[s("a,b,c"), s(",")]).unwrap();
        assert_eq!(parts, Value::List(vec![s("a"), s("b"), s("c")]));
        assert_eq!(text_join(&[s("-"), parts.clone()]).unwrap(), s("a-b-c"));
        assert_eq!(text_join(&[parts]).unwrap(), s("abc"));
    }

    #[test]
    fn test_blank() {
        assert_eq!(text_blank(&[Value::Nil]).unwrap(), Value::Boolean(true));
        assert_eq!(text_blank(&[s(" \t")]).unwrap(), Value::Boolean(true));
        assert_eq!(text_blank(&[s(" x ")]).unwrap(), Value::Boolean(false));
    }
}

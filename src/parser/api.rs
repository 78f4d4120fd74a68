use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::value::Value;
use crate::runner::eval::types::{Arg, Expr, FnLiteral, Invocation, Let, LetBinding};

use super::ast::Program;

#[derive(Parser)]
#[grammar = "parser/forms.pest"] // relative to src
pub struct FormsParser;

const TAB_WIDTH: usize = 2;

/// Indented dump of the token tree, one pair per line.
pub fn parse_to_token_tree(script: &str) -> Result<String> {
    let pairs = parse_to_pairs(script)?;
    let mut tree = vec![];
    for pair in pairs {
        tree.push(pair_to_string(pair, 0).join("\n"));
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    let string_pads = " ".repeat(level * TAB_WIDTH);
    tree.push(format!("{}{}", string_pads, rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

pub fn parse_to_pairs(script: &str) -> Result<Pairs<Rule>> {
    FormsParser::parse(Rule::program, script).map_err(|e| BridgeError::Parse(e.to_string()))
}

/// Parse a script into its `require` declarations and body.
pub fn parse_program(script: &str) -> Result<Program> {
    let mut program = Program::default();
    for pair in parse_to_pairs(script)? {
        // `program` is the only top-level pair
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::require_form => {
                    program.requires = build_requires(inner)?;
                }
                Rule::EOI => { /* Do nothing */ }
                _ => program.body.push(build_statement(inner)?),
            }
        }
    }
    Ok(program)
}

fn build_requires(pair: Pair<Rule>) -> Result<Vec<String>> {
    let mut requires = vec![];
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::require_kw => { /* Do nothing */ }
            Rule::string => requires.push(build_string(inner)?),
            _ => return Err(get_unexpected_error(1, &inner)),
        }
    }
    Ok(requires)
}

/// A form in statement position. Bare values become `(identity v)` so that
/// every statement is an expression.
fn build_statement(pair: Pair<Rule>) -> Result<Expr> {
    Ok(match build_arg(pair)? {
        Arg::Expr(expr) => expr,
        other => Expr::Invocation(Invocation {
            target: FnLiteral::new("identity"),
            args: vec![other],
        }),
    })
}

fn build_arg(pair: Pair<Rule>) -> Result<Arg> {
    Ok(match pair.as_rule() {
        Rule::empty_form => Arg::Expr(Expr::Empty),
        Rule::let_form => Arg::Expr(build_let(pair)?),
        Rule::fn_form => {
            let symbol = pair
                .into_inner()
                .find(|p| p.as_rule() == Rule::symbol)
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            Arg::Expr(Expr::Literal(FnLiteral::new(symbol)))
        }
        Rule::call => Arg::Expr(build_call(pair)?),
        Rule::symbol => Arg::Expr(Expr::Literal(FnLiteral::new(pair.as_str()))),
        Rule::string => Arg::Text(build_string(pair)?),
        _ => Arg::Value(build_value(pair)?),
    })
}

fn build_call(pair: Pair<Rule>) -> Result<Expr> {
    let mut inner = pair.into_inner();
    let head = match inner.next() {
        Some(head) if head.as_rule() == Rule::symbol => head,
        Some(other) => return Err(get_unexpected_error(2, &other)),
        None => return Ok(Expr::Empty),
    };
    let mut args = vec![];
    for arg in inner {
        args.push(build_arg(arg)?);
    }
    Ok(Expr::Invocation(Invocation {
        target: FnLiteral::new(head.as_str()),
        args,
    }))
}

fn build_let(pair: Pair<Rule>) -> Result<Expr> {
    let mut bindings = vec![];
    let mut body = vec![];
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::let_kw => { /* Do nothing */ }
            Rule::bindings => bindings = build_bindings(inner)?,
            _ => body.push(build_statement(inner)?),
        }
    }
    Ok(Expr::Let(Let { bindings, body }))
}

fn build_bindings(pair: Pair<Rule>) -> Result<Vec<LetBinding>> {
    let forms: Vec<Pair<Rule>> = pair.into_inner().collect();
    if forms.len() % 2 != 0 {
        return Err(BridgeError::OddBindingForms { count: forms.len() });
    }
    let mut bindings = vec![];
    let mut forms = forms.into_iter();
    while let (Some(name), Some(value)) = (forms.next(), forms.next()) {
        if name.as_rule() != Rule::symbol {
            return Err(custom_error(
                format!("let binding name must be a symbol, found {:?}", name.as_rule()),
                &name,
            ));
        }
        bindings.push(LetBinding {
            name: name.as_str().to_string(),
            value: build_arg(value)?,
        });
    }
    Ok(bindings)
}

fn build_value(pair: Pair<Rule>) -> Result<Value> {
    Ok(match pair.as_rule() {
        Rule::nil => Value::Nil,
        Rule::boolean => Value::Boolean(pair.as_str() == "true"),
        Rule::integer => Value::Integer(
            pair.as_str()
                .parse()
                .map_err(|_| custom_error("integer out of range".to_string(), &pair))?,
        ),
        Rule::float => Value::Float(
            pair.as_str()
                .parse()
                .map_err(|_| custom_error("malformed float".to_string(), &pair))?,
        ),
        Rule::character => Value::Char(build_char(&pair)?),
        Rule::keyword => Value::Keyword(pair.as_str()[1..].to_string()),
        Rule::string => Value::String(build_string(pair)?),
        Rule::symbol => Value::symbol(pair.as_str()),
        Rule::vector => {
            let mut items = vec![];
            for item in pair.into_inner() {
                items.push(build_value(item)?);
            }
            Value::List(items)
        }
        _ => return Err(get_unexpected_error(3, &pair)),
    })
}

fn build_char(pair: &Pair<Rule>) -> Result<char> {
    let text = &pair.as_str()[1..];
    Ok(match text {
        "space" => ' ',
        "newline" => '\n',
        "tab" => '\t',
        _ => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(custom_error(format!("unknown character '\\{}'", text), pair)),
            }
        }
    })
}

fn build_string(pair: Pair<Rule>) -> Result<String> {
    let raw = match pair.clone().into_inner().next() {
        Some(inner) => inner.as_str(),
        None => "",
    };
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                return Err(custom_error(format!("unsupported escape '\\{}'", other), &pair));
            }
            None => return Err(custom_error("dangling escape".to_string(), &pair)),
        }
    }
    Ok(out)
}

fn custom_error(message: String, pair: &Pair<Rule>) -> BridgeError {
    let error: Error<Rule> = Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span());
    BridgeError::Parse(error.to_string())
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> BridgeError {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    custom_error(message, pair)
}

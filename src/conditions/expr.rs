use std::fmt;
use std::ops::Not;
use std::str::FromStr;

use axum::http::{HeaderName, Method};
use serde_json::Value;

use crate::error::ConditionError;

/// Deepest nesting accepted when compiling a condition.
pub const MAX_CONDITION_DEPTH: usize = 32;

/// A request attribute a condition can read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Method,
    Path,
    /// Host without port.
    Host,
    Header(HeaderName),
    /// Extension field populated by an earlier action.
    Context(String),
}

impl Field {
    /// Method and host compare case-insensitively; everything else is exact.
    pub(crate) fn case_insensitive(&self) -> bool {
        matches!(self, Field::Method | Field::Host)
    }
}

impl FromStr for Field {
    type Err = ConditionError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector {
            "method" => return Ok(Field::Method),
            "path" => return Ok(Field::Path),
            "host" => return Ok(Field::Host),
            _ => {}
        }

        match selector.split_once('.') {
            Some(("header" | "headers", name)) => HeaderName::from_bytes(name.as_bytes())
                .map(Field::Header)
                .map_err(|_| ConditionError::UnknownField(selector.to_owned())),
            Some(("context", name)) if !name.is_empty() => Ok(Field::Context(name.to_owned())),
            _ => Err(ConditionError::UnknownField(selector.to_owned())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Method => write!(f, "method"),
            Field::Path => write!(f, "path"),
            Field::Host => write!(f, "host"),
            Field::Header(name) => write!(f, "header.{name}"),
            Field::Context(name) => write!(f, "context.{name}"),
        }
    }
}

/// Compiled condition. Built once from the raw s-expression form
/// (`["and", ["method", "GET"], ["pathPrefix", "/v1"]]`) and evaluated per request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Always,
    Never,
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Equals { field: Field, value: String },
    Exists(Field),
    Method(Vec<Method>),
    PathExact(String),
    PathPrefix(String),
}

impl Condition {
    /// Compile a raw condition. A bare string names a zero-operand operator.
    pub fn compile(raw: &Value) -> Result<Self, ConditionError> {
        compile_at(raw, 1)
    }

    #[must_use]
    pub fn and(self, other: Condition) -> Condition {
        Condition::And(vec![self, other])
    }

    #[must_use]
    pub fn or(self, other: Condition) -> Condition {
        Condition::Or(vec![self, other])
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        Condition::Not(Box::new(self))
    }
}

fn compile_at(raw: &Value, depth: usize) -> Result<Condition, ConditionError> {
    if depth > MAX_CONDITION_DEPTH {
        return Err(ConditionError::TooDeep(MAX_CONDITION_DEPTH));
    }

    let (name, operands) = match raw {
        Value::String(name) => (name.as_str(), &[][..]),
        Value::Array(items) => match items.split_first() {
            Some((Value::String(name), rest)) => (name.as_str(), rest),
            _ => return Err(ConditionError::Malformed(raw.to_string())),
        },
        other => return Err(ConditionError::Malformed(other.to_string())),
    };

    let nested = |operands: &[Value]| {
        operands
            .iter()
            .map(|operand| compile_at(operand, depth + 1))
            .collect::<Result<Vec<_>, _>>()
    };

    match name {
        "always" => {
            exactly("always", operands, 0)?;
            Ok(Condition::Always)
        }
        "never" => {
            exactly("never", operands, 0)?;
            Ok(Condition::Never)
        }
        "and" => {
            at_least("and", operands, 1)?;
            Ok(Condition::And(nested(operands)?))
        }
        "or" => {
            at_least("or", operands, 1)?;
            Ok(Condition::Or(nested(operands)?))
        }
        "not" => {
            exactly("not", operands, 1)?;
            Ok(Condition::Not(Box::new(compile_at(&operands[0], depth + 1)?)))
        }
        "equals" => {
            exactly("equals", operands, 2)?;
            Ok(Condition::Equals {
                field: field("equals", &operands[0])?,
                value: literal("equals", &operands[1])?,
            })
        }
        "exists" => {
            exactly("exists", operands, 1)?;
            Ok(Condition::Exists(field("exists", &operands[0])?))
        }
        "method" => {
            at_least("method", operands, 1)?;
            operands
                .iter()
                .map(method)
                .collect::<Result<Vec<_>, _>>()
                .map(Condition::Method)
        }
        "pathExact" => {
            exactly("pathExact", operands, 1)?;
            Ok(Condition::PathExact(string("pathExact", &operands[0])?))
        }
        "pathPrefix" => {
            exactly("pathPrefix", operands, 1)?;
            Ok(Condition::PathPrefix(string("pathPrefix", &operands[0])?))
        }
        unknown => Err(ConditionError::UnknownOperator(unknown.to_owned())),
    }
}

fn exactly(operator: &'static str, operands: &[Value], n: usize) -> Result<(), ConditionError> {
    if operands.len() == n {
        return Ok(());
    }
    Err(ConditionError::Arity {
        operator,
        expected: match n {
            0 => "no",
            1 => "exactly 1",
            _ => "exactly 2",
        },
        found: operands.len(),
    })
}

fn at_least(operator: &'static str, operands: &[Value], n: usize) -> Result<(), ConditionError> {
    if operands.len() >= n {
        return Ok(());
    }
    Err(ConditionError::Arity {
        operator,
        expected: "at least 1",
        found: operands.len(),
    })
}

fn string(operator: &'static str, operand: &Value) -> Result<String, ConditionError> {
    operand
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ConditionError::Operand {
            operator,
            reason: format!("expected a string, got {operand}"),
        })
}

fn field(operator: &'static str, operand: &Value) -> Result<Field, ConditionError> {
    string(operator, operand)?.parse()
}

fn literal(operator: &'static str, operand: &Value) -> Result<String, ConditionError> {
    match operand {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConditionError::Operand {
            operator,
            reason: format!("expected a string, number or boolean literal, got {other}"),
        }),
    }
}

fn method(operand: &Value) -> Result<Method, ConditionError> {
    let name = string("method", operand)?;
    Method::from_bytes(name.to_ascii_uppercase().as_bytes()).map_err(|_| ConditionError::Operand {
        operator: "method",
        reason: format!("\"{name}\" is not an HTTP method"),
    })
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, name: &str, items: &[Condition]) -> fmt::Result {
            write!(f, "({name}")?;
            for item in items {
                write!(f, " {item}")?;
            }
            write!(f, ")")
        }

        match self {
            Condition::Always => write!(f, "always"),
            Condition::Never => write!(f, "never"),
            Condition::And(items) => list(f, "and", items),
            Condition::Or(items) => list(f, "or", items),
            Condition::Not(inner) => write!(f, "(not {inner})"),
            Condition::Equals { field, value } => write!(f, "(equals {field} {value:?})"),
            Condition::Exists(field) => write!(f, "(exists {field})"),
            Condition::Method(methods) => {
                write!(f, "(method")?;
                for m in methods {
                    write!(f, " {m}")?;
                }
                write!(f, ")")
            }
            Condition::PathExact(path) => write!(f, "(pathExact {path:?})"),
            Condition::PathPrefix(prefix) => write!(f, "(pathPrefix {prefix:?})"),
        }
    }
}

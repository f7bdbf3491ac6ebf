use crate::conditions::context::{hostname, RequestContext};
use crate::conditions::expr::{Condition, Field};
use crate::error::EvaluationError;

/// Evaluate a compiled condition against a request.
///
/// `and`/`or` stop at the first operand that decides the result, so a later
/// operand can neither be looked at nor raise an error. Unresolvable fields are
/// errors, not `false`.
pub fn evaluate<C>(condition: &Condition, ctx: &C) -> Result<bool, EvaluationError>
where
    C: RequestContext + ?Sized,
{
    match condition {
        Condition::Always => Ok(true),
        Condition::Never => Ok(false),
        Condition::And(items) => {
            for item in items {
                if !evaluate(item, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or(items) => {
            for item in items {
                if evaluate(item, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Not(inner) => Ok(!evaluate(inner, ctx)?),
        Condition::Equals { field, value } => {
            let actual = resolve(field, ctx)?;
            if field.case_insensitive() {
                Ok(actual.eq_ignore_ascii_case(value))
            } else {
                Ok(actual == value.as_str())
            }
        }
        Condition::Exists(field) => Ok(resolve(field, ctx).is_ok()),
        Condition::Method(methods) => Ok(methods.contains(ctx.method())),
        Condition::PathExact(path) => Ok(ctx.path() == path.as_str()),
        Condition::PathPrefix(prefix) => Ok(ctx.path().starts_with(prefix.as_str())),
    }
}

fn resolve<'a, C>(field: &Field, ctx: &'a C) -> Result<&'a str, EvaluationError>
where
    C: RequestContext + ?Sized,
{
    match field {
        Field::Method => Ok(ctx.method().as_str()),
        Field::Path => Ok(ctx.path()),
        Field::Host => ctx.host().map(hostname).ok_or(EvaluationError::MissingHost),
        Field::Header(name) => ctx
            .header(name)
            .ok_or_else(|| EvaluationError::MissingHeader(name.to_string()))?
            .to_str()
            .map_err(|_| EvaluationError::NonUtf8Header(name.to_string())),
        Field::Context(name) => ctx
            .context_field(name)
            .ok_or_else(|| EvaluationError::MissingField(name.clone())),
    }
}

//! Built-in functions, namespaces, and value methods.

use chrono::{TimeZone, Utc};

use crate::error::{ExprError, Result};
use crate::interpreter::{len, to_number, Scope};
use crate::value::Value;

/// Global objects reachable as `Name.member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Namespace {
    Math,
    Json,
    Date,
    Number,
}

impl Namespace {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match name {
            "Math" => Some(Self::Math),
            "JSON" => Some(Self::Json),
            "Date" => Some(Self::Date),
            "Number" => Some(Self::Number),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::Json => "JSON",
            Self::Date => "Date",
            Self::Number => "Number",
        }
    }
}

pub(crate) fn namespace_constant(namespace: Namespace, property: &str) -> Value {
    match (namespace, property) {
        (Namespace::Math, "PI") => Value::Number(std::f64::consts::PI),
        (Namespace::Math, "E") => Value::Number(std::f64::consts::E),
        (Namespace::Number, "MAX_SAFE_INTEGER") => Value::Number(9_007_199_254_740_991.0),
        (Namespace::Number, "MIN_SAFE_INTEGER") => Value::Number(-9_007_199_254_740_991.0),
        _ => Value::Null,
    }
}

/// Recursively flatten list arguments.
fn flatten(args: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::List(items) => out.extend(flatten(items)),
            other => out.push(other),
        }
    }
    out
}

/// Numeric aggregate inputs: blanks are skipped, anything else must coerce.
fn numbers(function: &str, args: Vec<Value>) -> Result<Vec<f64>> {
    flatten(args)
        .into_iter()
        .filter(|v| !v.is_blank())
        .map(|v| {
            v.numeric()
                .or_else(|| matches!(v, Value::Bool(_)).then(|| v.coerce_number()).flatten())
                .ok_or_else(|| {
                    ExprError::argument(function, format!("{} is not a number", v.to_json_string()))
                })
        })
        .collect()
}

fn arity(function: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::argument(
            function,
            format!("expects {expected} argument(s), got {}", args.len()),
        ))
    }
}

fn first(args: &[Value]) -> &Value {
    args.first().unwrap_or(&Value::Null)
}

fn nonempty(function: &str, values: Vec<f64>) -> Result<Vec<f64>> {
    if values.is_empty() {
        Err(ExprError::argument(function, "needs at least one value"))
    } else {
        Ok(values)
    }
}

/// Upper-case formula functions and the `Number`/`String`/`Boolean` converters.
pub(crate) fn call_function(name: &str, args: Vec<Value>, scope: &Scope) -> Result<Value> {
    match name {
        "SUM" => Ok(Value::Number(numbers(name, args)?.iter().sum())),
        "AVG" => {
            let values = nonempty(name, numbers(name, args)?)?;
            #[allow(clippy::cast_precision_loss)]
            let count = values.len() as f64;
            Ok(Value::Number(values.iter().sum::<f64>() / count))
        }
        "MIN" => Ok(Value::Number(
            nonempty(name, numbers(name, args)?)?
                .into_iter()
                .fold(f64::INFINITY, f64::min),
        )),
        "MAX" => Ok(Value::Number(
            nonempty(name, numbers(name, args)?)?
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max),
        )),
        "COUNT" => Ok(len(
            flatten(args).iter().filter(|v| !matches!(v, Value::Null)).count(),
        )),
        "CONCAT" => Ok(Value::String(
            args.iter()
                .map(|v| match v {
                    Value::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect(),
        )),
        "TODAY" => {
            arity(name, &args, 0)?;
            let midnight = scope
                .now()
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|dt| Utc.from_utc_datetime(&dt))
                .ok_or_else(|| ExprError::argument(name, "clock out of range"))?;
            Ok(Value::Date(midnight))
        }
        "DAYS_BETWEEN" => {
            arity(name, &args, 2)?;
            let date = |v: &Value| {
                v.as_date().ok_or_else(|| {
                    ExprError::argument(name, format!("{} is not a date", v.to_json_string()))
                })
            };
            let start = date(&args[0])?;
            let end = date(&args[1])?;
            #[allow(clippy::cast_precision_loss)]
            let millis = (end - start).num_milliseconds() as f64;
            Ok(Value::Number((millis / 86_400_000.0).floor()))
        }
        "Number" => Ok(first(&args)
            .coerce_number()
            .map_or(Value::Null, Value::Number)),
        "String" => Ok(Value::String(first(&args).to_display_string())),
        "Boolean" => Ok(Value::Bool(first(&args).truthy())),
        _ => Err(ExprError::UnknownIdentifier {
            name: name.to_string(),
        }),
    }
}

fn math_unary(args: &[Value], f: fn(f64) -> f64) -> Result<Value> {
    Ok(Value::Number(f(to_number(first(args))?)))
}

pub(crate) fn call_namespace(
    namespace: Namespace,
    method: &str,
    args: Vec<Value>,
    scope: &Scope,
) -> Result<Value> {
    match (namespace, method) {
        (Namespace::Math, "abs") => math_unary(&args, f64::abs),
        (Namespace::Math, "ceil") => math_unary(&args, f64::ceil),
        (Namespace::Math, "floor") => math_unary(&args, f64::floor),
        (Namespace::Math, "trunc") => math_unary(&args, f64::trunc),
        (Namespace::Math, "round") => math_unary(&args, round_half_up),
        (Namespace::Math, "sign") => math_unary(&args, |n| if n == 0.0 { 0.0 } else { n.signum() }),
        (Namespace::Math, "sqrt") => {
            let n = to_number(first(&args))?;
            if n < 0.0 {
                return Err(ExprError::argument("Math.sqrt", "negative argument"));
            }
            Ok(Value::Number(n.sqrt()))
        }
        (Namespace::Math, "pow") => {
            arity("Math.pow", &args, 2)?;
            let result = to_number(&args[0])?.powf(to_number(&args[1])?);
            if result.is_finite() {
                Ok(Value::Number(result))
            } else {
                Err(ExprError::argument("Math.pow", "result is not a finite number"))
            }
        }
        (Namespace::Math, "min") => Ok(Value::Number(
            nonempty("Math.min", numbers("Math.min", args)?)?
                .into_iter()
                .fold(f64::INFINITY, f64::min),
        )),
        (Namespace::Math, "max") => Ok(Value::Number(
            nonempty("Math.max", numbers("Math.max", args)?)?
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max),
        )),
        (Namespace::Json, "stringify") => Ok(Value::String(first(&args).to_json_string())),
        (Namespace::Json, "parse") => {
            let text = first(&args)
                .as_str()
                .ok_or_else(|| ExprError::argument("JSON.parse", "expects a string"))?;
            serde_json::from_str::<serde_json::Value>(text)
                .map(Value::from)
                .map_err(|e| ExprError::argument("JSON.parse", e.to_string()))
        }
        #[allow(clippy::cast_precision_loss)]
        (Namespace::Date, "now") => Ok(Value::Number(scope.now().timestamp_millis() as f64)),
        (Namespace::Number, "isFinite") => Ok(Value::Bool(
            matches!(first(&args), Value::Number(n) if n.is_finite()),
        )),
        (Namespace::Number, "isInteger") => Ok(Value::Bool(
            matches!(first(&args), Value::Number(n) if n.is_finite() && n.fract() == 0.0),
        )),
        _ => Err(ExprError::NotCallable {
            name: format!("{}.{method}", namespace.name()),
        }),
    }
}

fn string_arg(method: &str, args: &[Value]) -> Result<String> {
    match first(args) {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Err(ExprError::argument(method, "expects an argument")),
        other => Ok(other.to_display_string()),
    }
}

/// Resolve a possibly negative slice bound against `len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn slice_bound(value: Option<&Value>, len: usize, default: usize) -> Result<usize> {
    let Some(value) = value.filter(|v| !matches!(v, Value::Null)) else {
        return Ok(default);
    };
    let n = to_number(value)?.trunc();
    let resolved = if n < 0.0 { (len as f64 + n).max(0.0) } else { n.min(len as f64) };
    Ok(resolved as usize)
}

/// Methods invoked on a value, e.g. `data.name.trim()`.
pub(crate) fn call_method(target: &Value, method: &str, args: Vec<Value>) -> Result<Value> {
    match target {
        Value::String(s) => string_method(s, method, &args),
        Value::List(items) => match method {
            "includes" => Ok(Value::Bool(items.contains(first(&args)))),
            "join" => {
                let separator = match args.first() {
                    None | Some(Value::Null) => ",".to_string(),
                    Some(other) => other.to_display_string(),
                };
                Ok(Value::String(
                    items
                        .iter()
                        .map(|v| match v {
                            Value::Null => String::new(),
                            other => other.to_display_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(&separator),
                ))
            }
            _ => Err(not_callable(target, method)),
        },
        Value::Number(n) if method == "toFixed" => {
            let digits = match args.first() {
                None | Some(Value::Null) => 0.0,
                Some(v) => to_number(v)?,
            };
            if !(0.0..=100.0).contains(&digits) {
                return Err(ExprError::argument("toFixed", "digits must be between 0 and 100"));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let digits = digits as usize;
            Ok(Value::String(format!("{n:.digits$}")))
        }
        Value::Null => Err(ExprError::type_error(format!(
            "cannot read properties of null (reading '{method}')"
        ))),
        _ => Err(not_callable(target, method)),
    }
}

fn not_callable(target: &Value, method: &str) -> ExprError {
    ExprError::NotCallable {
        name: format!("{}.{method}", target.type_name()),
    }
}

fn string_method(s: &str, method: &str, args: &[Value]) -> Result<Value> {
    let value = match method {
        "trim" => Value::String(s.trim().to_string()),
        "toUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "includes" => Value::Bool(s.contains(string_arg(method, args)?.as_str())),
        "startsWith" => Value::Bool(s.starts_with(string_arg(method, args)?.as_str())),
        "endsWith" => Value::Bool(s.ends_with(string_arg(method, args)?.as_str())),
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let start = slice_bound(args.first(), chars.len(), 0)?;
            let end = slice_bound(args.get(1), chars.len(), chars.len())?;
            Value::String(if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            })
        }
        "split" => {
            let separator = string_arg(method, args)?;
            let parts: Vec<Value> = if separator.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            };
            Value::List(parts)
        }
        "toString" => Value::String(s.to_string()),
        _ => {
            return Err(ExprError::NotCallable {
                name: format!("string.{method}"),
            })
        }
    };
    Ok(value)
}

/// Half-up like JavaScript, so -2.5 rounds to -2. Compares the remainder
/// instead of adding 0.5, which would round 0.49999999999999994 up.
fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

//! Tree-walking evaluator.
//!
//! Identifiers resolve only against the [`Scope`] handed in by the caller.
//! Built-in functions and the `Math`/`JSON`/`Date`/`Number` namespaces are
//! reachable only in call or member position, and a scope binding with the
//! same name shadows them.

use chrono::{DateTime, Utc};

use crate::error::{ExprError, Result};
use crate::functions::{self, Namespace};
use crate::parser::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::value::{Map, Value};

/// Variable bindings visible to an expression.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Map,
    now: Option<DateTime<Utc>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Pin the clock seen by `TODAY()` and `Date.now()`.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn namespace(&self, expr: &Expr) -> Option<Namespace> {
        match expr {
            Expr::Ident(name) if self.get(name).is_none() => Namespace::parse(name),
            _ => None,
        }
    }
}

pub(crate) fn eval(expr: &Expr, scope: &Scope) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Array(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Expr::Object(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, item) in entries {
                map.insert(key.clone(), eval(item, scope)?);
            }
            Ok(Value::Map(map))
        }
        Expr::Ident(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::UnknownIdentifier { name: name.clone() }),
        Expr::Unary { op, operand } => unary(*op, &eval(operand, scope)?),
        Expr::Binary { op, left, right } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            binary(*op, &left, &right)
        }
        Expr::Logical { op, left, right } => {
            let left = eval(left, scope)?;
            match (op, left.truthy()) {
                (LogicalOp::And, true) | (LogicalOp::Or, false) => eval(right, scope),
                _ => Ok(left),
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if eval(test, scope)?.truthy() {
                eval(consequent, scope)
            } else {
                eval(alternate, scope)
            }
        }
        Expr::Member { object, property } => {
            if let Some(namespace) = scope.namespace(object) {
                return Ok(functions::namespace_constant(namespace, property));
            }
            member(&eval(object, scope)?, property)
        }
        Expr::Index { object, index } => {
            let target = eval(object, scope)?;
            let index = eval(index, scope)?;
            index_value(&target, &index)
        }
        Expr::Call { callee, args } => call(callee, args, scope),
    }
}

fn call(callee: &Expr, args: &[Expr], scope: &Scope) -> Result<Value> {
    match callee {
        Expr::Ident(name) if scope.get(name).is_none() => {
            if name == "IF" {
                return lazy_if(args, scope);
            }
            functions::call_function(name, eval_args(args, scope)?, scope)
        }
        Expr::Member { object, property } => {
            if let Some(namespace) = scope.namespace(object) {
                return functions::call_namespace(namespace, property, eval_args(args, scope)?, scope);
            }
            let target = eval(object, scope)?;
            functions::call_method(&target, property, eval_args(args, scope)?)
        }
        Expr::Ident(name) => Err(ExprError::NotCallable { name: name.clone() }),
        _ => Err(ExprError::NotCallable {
            name: "expression".to_string(),
        }),
    }
}

/// `IF(cond, a, b)` evaluates only the selected branch.
fn lazy_if(args: &[Expr], scope: &Scope) -> Result<Value> {
    match args {
        [test, consequent] => {
            if eval(test, scope)?.truthy() {
                eval(consequent, scope)
            } else {
                Ok(Value::Null)
            }
        }
        [test, consequent, alternate] => {
            if eval(test, scope)?.truthy() {
                eval(consequent, scope)
            } else {
                eval(alternate, scope)
            }
        }
        _ => Err(ExprError::argument(
            "IF",
            format!("expects 2 or 3 arguments, got {}", args.len()),
        )),
    }
}

fn eval_args(args: &[Expr], scope: &Scope) -> Result<Vec<Value>> {
    args.iter().map(|arg| eval(arg, scope)).collect()
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
        UnaryOp::Negate => to_number(value).map(|n| Value::Number(-n)),
        UnaryOp::Plus => to_number(value).map(Value::Number),
    }
}

pub(crate) fn to_number(value: &Value) -> Result<f64> {
    value.coerce_number().ok_or_else(|| {
        ExprError::type_error(format!("cannot convert {} to a number", value.to_json_string()))
    })
}

fn finite(n: f64) -> Result<Value> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(ExprError::type_error("result is not a finite number"))
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => finite(to_number(left)? - to_number(right)?),
        BinaryOp::Mul => finite(to_number(left)? * to_number(right)?),
        BinaryOp::Div => finite(to_number(left)? / to_number(right)?),
        BinaryOp::Rem => finite(to_number(left)? % to_number(right)?),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Ok(Value::Bool(compare(op, left, right)))
        }
        BinaryOp::LooseEq => Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::LooseNe => Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::StrictEq => Ok(Value::Bool(left == right)),
        BinaryOp::StrictNe => Ok(Value::Bool(left != right)),
    }
}

/// String concatenation when either side is not a primitive number-like value.
fn add(left: &Value, right: &Value) -> Result<Value> {
    let numeric = |v: &Value| matches!(v, Value::Null | Value::Bool(_) | Value::Number(_));
    if numeric(left) && numeric(right) {
        finite(to_number(left)? + to_number(right)?)
    } else {
        Ok(Value::String(format!(
            "{}{}",
            left.to_display_string(),
            right.to_display_string()
        )))
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        _ => match (left.coerce_number(), right.coerce_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => false,
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::String(_)) => right.coerce_number() == Some(*a),
        (Value::String(_), Value::Number(b)) => left.coerce_number() == Some(*b),
        (Value::Bool(b), other) | (other, Value::Bool(b)) if !matches!(other, Value::Bool(_)) => {
            loose_eq(&Value::Number(if *b { 1.0 } else { 0.0 }), other)
        }
        _ => left == right,
    }
}

fn member(target: &Value, property: &str) -> Result<Value> {
    match target {
        Value::Null => Err(ExprError::type_error(format!(
            "cannot read properties of null (reading '{property}')"
        ))),
        Value::Map(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        Value::List(items) if property == "length" => Ok(len(items.len())),
        Value::String(s) if property == "length" => Ok(len(s.chars().count())),
        _ => Ok(Value::Null),
    }
}

fn index_value(target: &Value, index: &Value) -> Result<Value> {
    let position = || list_position(index);
    match target {
        Value::Null => Err(ExprError::type_error(format!(
            "cannot read properties of null (reading '{}')",
            index.to_display_string()
        ))),
        Value::List(items) => Ok(position()
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null)),
        Value::String(s) => Ok(position()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null)),
        Value::Map(map) => Ok(map
            .get(&index.to_display_string())
            .cloned()
            .unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn list_position(index: &Value) -> Option<usize> {
    match index {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as usize),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn len(n: usize) -> Value {
    Value::Number(n as f64)
}

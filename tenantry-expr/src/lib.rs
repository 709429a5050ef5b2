//! # Tenantry Expression Language
//!
//! A small, sandboxed expression language used for formula fields and custom
//! validators. The grammar follows JavaScript expression syntax: ternaries,
//! short-circuit logic, loose and strict equality, arithmetic, member access,
//! indexing, calls, and array/object literals.
//!
//! Evaluation has no access to anything beyond the [`Scope`] supplied by the
//! caller and a fixed set of built-ins (`SUM`, `AVG`, `IF`, `DAYS_BETWEEN`,
//! `Math.*`, `JSON.*`, string and list methods).
//!
//! ## Usage
//!
//! ```
//! use tenantry_expr::{Program, Scope, Value};
//!
//! let program = Program::compile("IF(value > 100, 'large', 'small')").unwrap();
//! let scope = Scope::new().with("value", 250);
//! assert_eq!(program.execute(&scope).unwrap(), Value::from("large"));
//! ```
//!
//! Compilation enforces [`Limits`] on input size and nesting depth, and caps
//! the height of the parsed tree at [`parser::MAX_TREE_HEIGHT`], so that
//! evaluating a user-authored expression never recurses deeper than that.

use serde::{Deserialize, Serialize};

mod error;
mod functions;
mod interpreter;
mod lexer;
pub mod parser;
pub mod value;

pub use error::{ExprError, Result};
pub use interpreter::Scope;
pub use parser::Expr;
pub use value::{Map, Value};

/// Default maximum expression size in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Parser resource limits. `max_depth` counts parentheses, unary operators
/// and object literals; the tree height cap applies on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_bytes: usize,
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A compiled expression, reusable across scopes.
#[derive(Debug, Clone)]
pub struct Program {
    expr: Expr,
}

impl Program {
    /// Compile with default [`Limits`].
    pub fn compile(source: &str) -> Result<Self> {
        Self::compile_with_limits(source, &Limits::default())
    }

    pub fn compile_with_limits(source: &str, limits: &Limits) -> Result<Self> {
        let expr = parser::parse(source, limits)?;
        Ok(Self { expr })
    }

    pub fn execute(&self, scope: &Scope) -> Result<Value> {
        interpreter::eval(&self.expr, scope)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// Compile and run `source` in one step.
pub fn evaluate(source: &str, scope: &Scope) -> Result<Value> {
    Program::compile(source)?.execute(scope)
}

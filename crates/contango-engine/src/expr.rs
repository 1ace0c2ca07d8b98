//! Parsed contract expression tree.
//!
//! The engine consumes contracts as an already-parsed expression tree; the
//! lexer/parser for the source language is an external concern. [`Expr`]'s
//! `Display` implementation is the canonical source rendering: it is what
//! gets persisted as a call's `dsl_source` and what structural memoization
//! keys on, so two structurally identical deferred sub-expressions render
//! identically.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use contango_core::{CallId, MarketName};

// =============================================================================
// EXPRESSION TREE
// =============================================================================

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

/// One node of a parsed contract expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Num(f64),
    /// String literal.
    Str(String),
    /// An identifier; only function parameters are bindable, so any name
    /// still present when a call is decomposed is unresolved.
    Name(String),
    /// Binary arithmetic.
    BinOp {
        /// Operator.
        op: BinOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A user-defined function call - the construct that reifies into a
    /// separately schedulable call.
    FunctionCall {
        /// Function name.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// An observed/simulated market price.
    Market {
        /// Market name.
        name: MarketName,
    },
    /// A price observation pinned to a calendar date.
    Fixing {
        /// The fixing date.
        date: NaiveDate,
        /// The observed expression.
        expr: Box<Expr>,
    },
    /// A reference to an already-reified call; produced by the graph
    /// generator when it rewrites a parent around a deferred child.
    CallRef {
        /// The reified call's id.
        call_id: CallId,
    },
}

impl Expr {
    /// Replace bound names with their argument expressions.
    pub fn substitute(&self, bindings: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Name(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Expr::BinOp { op, left, right } => Expr::BinOp {
                op: *op,
                left: Box::new(left.substitute(bindings)),
                right: Box::new(right.substitute(bindings)),
            },
            Expr::FunctionCall { name, args } => Expr::FunctionCall {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            Expr::Fixing { date, expr } => Expr::Fixing {
                date: *date,
                expr: Box::new(expr.substitute(bindings)),
            },
            Expr::Num(_) | Expr::Str(_) | Expr::Market { .. } | Expr::CallRef { .. } => {
                self.clone()
            }
        }
    }

    /// Collect market names referenced by this expression, in source order.
    pub fn collect_market_names(&self, out: &mut Vec<MarketName>) {
        match self {
            Expr::Market { name } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::BinOp { left, right, .. } => {
                left.collect_market_names(out);
                right.collect_market_names(out);
            }
            Expr::FunctionCall { args, .. } => {
                for arg in args {
                    arg.collect_market_names(out);
                }
            }
            Expr::Fixing { expr, .. } => expr.collect_market_names(out),
            Expr::Num(_) | Expr::Str(_) | Expr::Name(_) | Expr::CallRef { .. } => {}
        }
    }

    /// The fixing date governing this expression, when its root is a fixing.
    pub fn fixing_date(&self) -> Option<NaiveDate> {
        match self {
            Expr::Fixing { date, .. } => Some(*date),
            _ => None,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nested arithmetic is parenthesized so rendering is unambiguous
        // and canonical.
        match self {
            Expr::BinOp { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Expr::Str(s) => write!(f, "'{}'", s),
            Expr::Name(name) => write!(f, "{}", name),
            Expr::BinOp { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f)
            }
            Expr::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Market { name } => write!(f, "Market('{}')", name),
            Expr::Fixing { date, expr } => {
                write!(f, "Fixing('{}', {})", date.format("%Y-%m-%d"), expr)
            }
            Expr::CallRef { call_id } => write!(f, "Call('{}')", call_id),
        }
    }
}

// =============================================================================
// CONTRACT MODULE
// =============================================================================

/// A user-defined contract function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// Function name.
    pub name: String,
    /// Parameter names, in order.
    pub params: Vec<String>,
    /// Function body.
    pub body: Expr,
}

/// A fully parsed contract: its function definitions plus the top-level
/// expression to value.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractModule {
    /// User-defined functions.
    pub functions: Vec<FunctionDef>,
    /// The top-level contract expression.
    pub body: Expr,
}

impl ContractModule {
    /// A module with no function definitions.
    pub fn from_body(body: Expr) -> Self {
        Self {
            functions: Vec::new(),
            body,
        }
    }

    /// Look up a function definition by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// SOURCE INSPECTION
// =============================================================================

/// Extract every fixing date embedded in a call's stored source, in order
/// of appearance.
///
/// Stored sources carry fixings in canonical form, e.g.
/// `Fixing('2011-01-01', Market('#1'))`. One call may carry several
/// markers (`Fixing(d1, ...) + Fixing(d2, ...)` is a single call body), so
/// all of them are collected; calls without a date-bearing construct yield
/// an empty list.
pub fn parse_fixing_dates(source: &str) -> Vec<NaiveDate> {
    source
        .match_indices("Fixing('")
        .filter_map(|(start, marker)| {
            let rest = &source[start + marker.len()..];
            let end = rest.find('\'')?;
            NaiveDate::parse_from_str(&rest[..end], "%Y-%m-%d").ok()
        })
        .collect()
}

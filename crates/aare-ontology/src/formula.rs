//! Closed formula tree.
//!
//! Persisted as tagged JSON, for example:
//!
//! ```json
//! {"op": "or", "args": [
//!   {"op": "compare", "cmp": "le", "left": {"var": "dti"}, "right": {"lit": 43}},
//!   {"op": "var", "name": "counseling_disclosed"}
//! ]}
//! ```

use aare_types::{Number, Value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    And { args: Vec<Expr> },
    Or { args: Vec<Expr> },
    Not { arg: Box<Expr> },
    Implies { left: Box<Expr>, right: Box<Expr> },
    Compare { cmp: CompareOp, left: Term, right: Term },
    /// Boolean variable used as a condition.
    Var { name: String },
    /// Boolean constant.
    Lit { value: bool },
}

/// Comparison operand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Var(String),
    Lit(Value),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "<=", alias = "≤")]
    Le,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = ">=", alias = "≥")]
    Ge,
    #[serde(alias = "=", alias = "==")]
    Eq,
    #[serde(alias = "!=", alias = "≠")]
    Ne,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "≤",
            CompareOp::Gt => ">",
            CompareOp::Ge => "≥",
            CompareOp::Eq => "=",
            CompareOp::Ne => "≠",
        }
    }

    /// Only equality is defined between booleans.
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
        }
    }
}

impl Term {
    pub fn var(name: &str) -> Term {
        Term::Var(name.to_string())
    }

    pub fn num(value: i64) -> Term {
        Term::Lit(Value::Number(Number::from_i64(value)))
    }
}

// Binding strength, loosest first.
const PREC_IMPLIES: u8 = 1;
const PREC_OR: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_ATOM: u8 = 5;

impl Expr {
    pub fn var(name: &str) -> Expr {
        Expr::Var {
            name: name.to_string(),
        }
    }

    pub fn not(arg: Expr) -> Expr {
        Expr::Not { arg: Box::new(arg) }
    }

    pub fn and(args: Vec<Expr>) -> Expr {
        Expr::And { args }
    }

    pub fn or(args: Vec<Expr>) -> Expr {
        Expr::Or { args }
    }

    pub fn implies(left: Expr, right: Expr) -> Expr {
        Expr::Implies {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn compare(left: Term, cmp: CompareOp, right: Term) -> Expr {
        Expr::Compare { cmp, left, right }
    }

    /// Variables referenced anywhere in the formula, in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::And { args } | Expr::Or { args } => {
                for a in args {
                    a.collect_variables(out);
                }
            }
            Expr::Not { arg } => arg.collect_variables(out),
            Expr::Implies { left, right } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expr::Compare { left, right, .. } => {
                for t in [left, right] {
                    if let Term::Var(name) = t {
                        push_unique(out, name);
                    }
                }
            }
            Expr::Var { name } => push_unique(out, name),
            Expr::Lit { .. } => {}
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Implies { .. } => PREC_IMPLIES,
            Expr::Or { .. } => PREC_OR,
            Expr::And { .. } => PREC_AND,
            Expr::Not { .. } => PREC_NOT,
            Expr::Compare { .. } | Expr::Var { .. } | Expr::Lit { .. } => PREC_ATOM,
        }
    }

    /// Comparisons nested under a connective are parenthesized for readability.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        let wrap = self.precedence() < min_prec || matches!(self, Expr::Compare { .. });
        if wrap {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    fn fmt_nary(&self, f: &mut fmt::Formatter<'_>, args: &[Expr], symbol: &str) -> fmt::Result {
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                write!(f, " {symbol} ")?;
            }
            a.fmt_operand(f, self.precedence() + 1)?;
        }
        Ok(())
    }
}

fn push_unique<'a>(out: &mut Vec<&'a str>, name: &'a str) {
    if !out.contains(&name) {
        out.push(name);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) => f.write_str(name),
            Term::Lit(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And { args } => self.fmt_nary(f, args, "∧"),
            Expr::Or { args } => self.fmt_nary(f, args, "∨"),
            Expr::Not { arg } => {
                f.write_str("¬")?;
                arg.fmt_operand(f, PREC_NOT)
            }
            Expr::Implies { left, right } => {
                left.fmt_operand(f, PREC_IMPLIES + 1)?;
                f.write_str(" → ")?;
                right.fmt_operand(f, PREC_IMPLIES)
            }
            Expr::Compare { cmp, left, right } => {
                write!(f, "{left} {} {right}", cmp.symbol())
            }
            Expr::Var { name } => f.write_str(name),
            Expr::Lit { value } => write!(f, "{value}"),
        }
    }
}

//! Parser for the readable formula notation used in ontology documents
//! (`formula_readable`), e.g. `(dti ≤ 43) ∨ (compensating_factors ≥ 2)`.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! implies := or ( IMPLIES implies )?
//! or      := and ( OR and )*
//! and     := not ( AND not )*
//! not     := NOT not | atom
//! atom    := "(" implies ")" | term ( CMP term )?
//! term    := identifier | number | true | false
//! ```
//!
//! Both the mathematical symbols and ASCII spellings are accepted (`∧ && and`, `∨ || or`,
//! `¬ ! not`, `→ -> => implies`, `≤ <=`, `≥ >=`, `≠ !=`, `= ==`).
//!
//! Negation, parentheses and the right side of an implication may nest at most
//! [`MAX_NESTING`] levels deep.

use crate::formula::{CompareOp, Expr, Term};
use aare_types::{Number, Value};
use thiserror::Error;

/// Deepest nesting the readable notation accepts. Matches serde_json's recursion limit for
/// the tagged-tree form.
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at offset {offset}: {message}")]
pub struct FormulaParseError {
    /// Character offset into the input.
    pub offset: usize,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Implies,
    Cmp(CompareOp),
    Ident(String),
    Number(Number),
    Bool(bool),
}

pub fn parse_formula(input: &str) -> Result<Expr, FormulaParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.chars().count(),
        depth: 0,
    };
    let expr = parser.implies()?;
    if let Some((offset, tok)) = parser.tokens.get(parser.pos) {
        return Err(FormulaParseError {
            offset: *offset,
            message: format!("unexpected {tok:?} after complete formula"),
        });
    }
    Ok(expr)
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, FormulaParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (token, width) = match (c, next) {
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('¬', _) => (Token::Not, 1),
            ('!', Some('=')) => (Token::Cmp(CompareOp::Ne), 2),
            ('!', _) => (Token::Not, 1),
            ('∧', _) => (Token::And, 1),
            ('&', Some('&')) => (Token::And, 2),
            ('∨', _) => (Token::Or, 1),
            ('|', Some('|')) => (Token::Or, 2),
            ('→' | '⇒', _) => (Token::Implies, 1),
            ('-', Some('>')) | ('=', Some('>')) => (Token::Implies, 2),
            ('≤', _) => (Token::Cmp(CompareOp::Le), 1),
            ('<', Some('=')) => (Token::Cmp(CompareOp::Le), 2),
            ('<', _) => (Token::Cmp(CompareOp::Lt), 1),
            ('≥', _) => (Token::Cmp(CompareOp::Ge), 1),
            ('>', Some('=')) => (Token::Cmp(CompareOp::Ge), 2),
            ('>', _) => (Token::Cmp(CompareOp::Gt), 1),
            ('≠', _) => (Token::Cmp(CompareOp::Ne), 1),
            ('=', Some('=')) => (Token::Cmp(CompareOp::Eq), 2),
            ('=', _) => (Token::Cmp(CompareOp::Eq), 1),
            _ if starts_number(c, next) => {
                let mut j = i + 1;
                while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                    j += 1;
                }
                let text: String = chars[i..j].iter().collect();
                let n = Number::parse(&text).ok_or_else(|| FormulaParseError {
                    offset: start,
                    message: format!("invalid number literal '{text}'"),
                })?;
                (Token::Number(n), j - i)
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut j = i + 1;
                while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                    j += 1;
                }
                let word: String = chars[i..j].iter().collect();
                let token = match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "implies" => Token::Implies,
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Ident(word),
                };
                (token, j - i)
            }
            _ => {
                return Err(FormulaParseError {
                    offset: start,
                    message: format!("unexpected character '{c}'"),
                });
            }
        };

        out.push((start, token));
        i += width;
    }

    Ok(out)
}

fn starts_number(c: char, next: Option<char>) -> bool {
    let digit_next = next.is_some_and(|n| n.is_ascii_digit());
    c.is_ascii_digit() || ((c == '-' || c == '.') && digit_next)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.end)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> FormulaParseError {
        FormulaParseError {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn descend(&mut self) -> Result<(), FormulaParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error(format!("formula nests more than {MAX_NESTING} levels deep")));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn implies(&mut self) -> Result<Expr, FormulaParseError> {
        let left = self.or()?;
        if self.eat(&Token::Implies) {
            self.descend()?;
            let right = self.implies()?;
            self.ascend();
            return Ok(Expr::implies(left, right));
        }
        Ok(left)
    }

    fn or(&mut self) -> Result<Expr, FormulaParseError> {
        let mut args = vec![self.and()?];
        while self.eat(&Token::Or) {
            args.push(self.and()?);
        }
        Ok(collapse(args, Expr::or))
    }

    fn and(&mut self) -> Result<Expr, FormulaParseError> {
        let mut args = vec![self.not()?];
        while self.eat(&Token::And) {
            args.push(self.not()?);
        }
        Ok(collapse(args, Expr::and))
    }

    fn not(&mut self) -> Result<Expr, FormulaParseError> {
        if self.eat(&Token::Not) {
            self.descend()?;
            let inner = self.not()?;
            self.ascend();
            return Ok(Expr::not(inner));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, FormulaParseError> {
        if self.eat(&Token::LParen) {
            self.descend()?;
            let inner = self.implies()?;
            if !self.eat(&Token::RParen) {
                return Err(self.error("expected ')'"));
            }
            self.ascend();
            return Ok(inner);
        }

        let left_offset = self.offset();
        let left = self.term()?;
        if let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.term()?;
            return Ok(Expr::compare(left, op, right));
        }

        match left {
            Term::Var(name) => Ok(Expr::Var { name }),
            Term::Lit(Value::Bool(value)) => Ok(Expr::Lit { value }),
            Term::Lit(Value::Number(n)) => Err(FormulaParseError {
                offset: left_offset,
                message: format!("number {n} cannot be used as a condition"),
            }),
        }
    }

    fn term(&mut self) -> Result<Term, FormulaParseError> {
        let term = match self.peek() {
            Some(Token::Ident(name)) => Term::Var(name.clone()),
            Some(Token::Number(n)) => Term::Lit(Value::Number(*n)),
            Some(Token::Bool(b)) => Term::Lit(Value::Bool(*b)),
            Some(other) => return Err(self.error(format!("expected a variable or literal, found {other:?}"))),
            None => return Err(self.error("unexpected end of formula")),
        };
        self.pos += 1;
        Ok(term)
    }
}

fn collapse(mut args: Vec<Expr>, build: fn(Vec<Expr>) -> Expr) -> Expr {
    if args.len() == 1 {
        args.remove(0)
    } else {
        build(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_ontology_formulas() {
        for text in [
            "(dti ≤ 43) ∨ (compensating_factors ≥ 2)",
            "(fee_percentage < 8) ∨ counseling_disclosed",
            "¬(has_guarantee ∧ has_approval)",
            "(credit_score ≥ 620) ∨ ¬escrow_waived",
            "is_denial → has_specific_reason",
        ] {
            let expr = parse_formula(text).expect("formula parses");
            assert_eq!(expr.to_string(), text);
        }
    }

    #[test]
    fn ascii_spellings_match_symbols() {
        let ascii = parse_formula("!(a && b) || c -> d").unwrap();
        let words = parse_formula("NOT (a AND b) OR c IMPLIES d").unwrap();
        let symbols = parse_formula("¬(a ∧ b) ∨ c → d").unwrap();
        assert_eq!(ascii, symbols);
        assert_eq!(words, symbols);
    }

    #[test]
    fn implication_is_right_associative() {
        let e = parse_formula("a → b → c").unwrap();
        assert_eq!(
            e,
            Expr::implies(
                Expr::var("a"),
                Expr::implies(Expr::var("b"), Expr::var("c"))
            )
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let e = parse_formula("a ∨ b ∧ c").unwrap();
        assert_eq!(
            e,
            Expr::or(vec![
                Expr::var("a"),
                Expr::and(vec![Expr::var("b"), Expr::var("c")])
            ])
        );
    }

    #[test]
    fn parses_decimal_and_negative_literals() {
        let e = parse_formula("rate >= -1.25").unwrap();
        assert_eq!(
            e,
            Expr::compare(
                Term::var("rate"),
                CompareOp::Ge,
                Term::Lit(Value::Number(Number::parse("-1.25").unwrap()))
            )
        );
    }

    #[test]
    fn bool_equality_parses() {
        let e = parse_formula("flag = false").unwrap();
        assert_eq!(
            e,
            Expr::compare(Term::var("flag"), CompareOp::Eq, Term::Lit(Value::Bool(false)))
        );
    }

    #[test]
    fn reports_offsets_for_errors() {
        let err = parse_formula("(a ∧ b").unwrap_err();
        assert_eq!(err.offset, 6);
        assert!(err.message.contains("')'"));

        let err = parse_formula("a # b").unwrap_err();
        assert_eq!(err.offset, 2);

        let err = parse_formula("43 ∨ a").unwrap_err();
        assert!(err.message.contains("cannot be used as a condition"));

        let err = parse_formula("a b").unwrap_err();
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_formula("   ").is_err());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let negations = format!("{}a", "¬".repeat(10_000));
        let err = parse_formula(&negations).unwrap_err();
        assert!(err.message.contains("levels deep"), "{err}");
        assert!(err.offset <= MAX_NESTING + 1);

        let err = parse_formula(&"(".repeat(10_000)).unwrap_err();
        assert!(err.message.contains("levels deep"), "{err}");

        let chain = vec!["a"; 10_000].join(" → ");
        let err = parse_formula(&chain).unwrap_err();
        assert!(err.message.contains("levels deep"), "{err}");
    }

    #[test]
    fn nesting_at_the_limit_parses() {
        let text = format!("{}a", "¬".repeat(MAX_NESTING));
        assert!(parse_formula(&text).is_ok());

        let text = format!("{}a{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(parse_formula(&text).unwrap(), Expr::var("a"));

        let text = format!("{}a", "¬".repeat(MAX_NESTING + 1));
        assert!(parse_formula(&text).is_err());
    }

    #[test]
    fn long_flat_chains_are_not_nesting() {
        let text = vec!["a"; 1_000].join(" ∧ ");
        assert!(parse_formula(&text).is_ok());
    }

    mod roundtrip {
        use super::*;
        use proptest::prelude::*;

        fn arb_name() -> impl Strategy<Value = String> {
            "[a-z][a-z_]{0,6}".prop_filter("keywords are not names", |n| {
                !matches!(
                    n.as_str(),
                    "and" | "or" | "not" | "implies" | "true" | "false"
                )
            })
        }

        fn arb_term() -> impl Strategy<Value = Term> {
            prop_oneof![
                arb_name().prop_map(Term::Var),
                (-1000i64..1000).prop_map(Term::num),
            ]
        }

        fn arb_op() -> impl Strategy<Value = CompareOp> {
            prop_oneof![
                Just(CompareOp::Lt),
                Just(CompareOp::Le),
                Just(CompareOp::Gt),
                Just(CompareOp::Ge),
                Just(CompareOp::Eq),
                Just(CompareOp::Ne),
            ]
        }

        fn arb_expr() -> impl Strategy<Value = Expr> {
            let leaf = prop_oneof![
                arb_name().prop_map(|n| Expr::var(&n)),
                any::<bool>().prop_map(|value| Expr::Lit { value }),
                (arb_term(), arb_op(), arb_term()).prop_map(|(l, op, r)| Expr::compare(l, op, r)),
            ];
            leaf.prop_recursive(4, 24, 3, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::and),
                    prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::or),
                    inner.clone().prop_map(Expr::not),
                    (inner.clone(), inner).prop_map(|(a, b)| Expr::implies(a, b)),
                ]
            })
        }

        proptest! {
            #[test]
            fn readable_form_parses_back(expr in arb_expr()) {
                let text = expr.to_string();
                let parsed = parse_formula(&text);
                prop_assert_eq!(parsed, Ok(expr), "text: {}", text);
            }
        }
    }
}

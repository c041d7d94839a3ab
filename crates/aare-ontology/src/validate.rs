use crate::error::{ExtractionError, OntologyError, SchemaError};
use crate::formula::{Expr, Term};
use crate::model::{Constraint, DerivedRule, ExtractorRule, Ontology, PatternType, VarType};
use aare_types::ValueKind;
use regex::{Regex, RegexBuilder};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// An ontology that passed validation, with its extractor patterns compiled.
///
/// Only obtainable through [`validate`]; immutable afterwards.
#[derive(Clone, Debug)]
pub struct ValidatedOntology {
    ontology: Ontology,
    extractors: Vec<CompiledExtractor>,
    fingerprint: String,
}

#[derive(Clone, Debug)]
pub struct CompiledExtractor {
    pub variable: String,
    pub matcher: Matcher,
}

#[derive(Clone, Debug)]
pub enum Matcher {
    /// Case-insensitive regex with exactly one capture group.
    Pattern { value_type: PatternType, regex: Regex },
    /// Lowercased keywords, matched as substrings of the lowercased text.
    Keywords { keywords: Vec<String> },
}

impl ValidatedOntology {
    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Extractors in variable-name order.
    pub fn extractors(&self) -> &[CompiledExtractor] {
        &self.extractors
    }

    /// SHA-256 over the canonical JSON of the model.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn name(&self) -> &str {
        &self.ontology.name
    }

    pub fn version(&self) -> &str {
        &self.ontology.version
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.ontology.constraints
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.ontology.constraints.iter().find(|c| c.id == id)
    }
}

/// Where a variable's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Pattern,
    Keyword,
    Derived,
    Constant(ValueKind),
}

impl Source {
    fn kind(self) -> ValueKind {
        match self {
            Source::Pattern | Source::Derived => ValueKind::Number,
            Source::Keyword => ValueKind::Bool,
            Source::Constant(kind) => kind,
        }
    }
}

fn kind_of(var_type: VarType) -> ValueKind {
    if var_type.is_numeric() {
        ValueKind::Number
    } else {
        ValueKind::Bool
    }
}

pub fn validate(ontology: Ontology) -> Result<ValidatedOntology, OntologyError> {
    if ontology.name.trim().is_empty() {
        return Err(SchemaError::missing("name").into());
    }
    if ontology.version.trim().is_empty() {
        return Err(SchemaError::missing("version").into());
    }

    let sources = collect_sources(&ontology)?;
    check_derived(&ontology, &sources)?;
    check_constraints(&ontology.constraints, &sources)?;

    let extractors = ontology
        .extractors
        .iter()
        .map(|(variable, rule)| compile(variable, rule))
        .collect::<Result<Vec<_>, _>>()?;

    let fingerprint = fingerprint_ontology(&ontology)?;

    Ok(ValidatedOntology {
        ontology,
        extractors,
        fingerprint,
    })
}

fn collect_sources(ontology: &Ontology) -> Result<BTreeMap<&str, Source>, SchemaError> {
    let extractor_sources = ontology.extractors.iter().map(|(name, rule)| {
        let source = if rule.is_boolean() {
            Source::Keyword
        } else {
            Source::Pattern
        };
        (name.as_str(), source)
    });
    let derived_sources = ontology
        .derived
        .keys()
        .map(|name| (name.as_str(), Source::Derived));
    let constant_sources = ontology
        .constants
        .iter()
        .map(|(name, value)| (name.as_str(), Source::Constant(value.kind())));

    let mut sources = BTreeMap::new();
    for (name, source) in extractor_sources.chain(derived_sources).chain(constant_sources) {
        if sources.insert(name, source).is_some() {
            return Err(SchemaError::ConflictingSource {
                variable: name.to_string(),
            });
        }
    }
    Ok(sources)
}

fn check_derived(ontology: &Ontology, sources: &BTreeMap<&str, Source>) -> Result<(), SchemaError> {
    for (variable, rule) in &ontology.derived {
        let invalid = |message: String| SchemaError::InvalidDerived {
            variable: variable.clone(),
            message,
        };
        match rule {
            DerivedRule::Ratio { .. } => {
                for input in rule.inputs() {
                    match sources.get(input) {
                        Some(Source::Pattern) | Some(Source::Constant(ValueKind::Number)) => {}
                        Some(Source::Derived) => {
                            return Err(invalid(format!(
                                "input '{input}' is itself derived"
                            )));
                        }
                        Some(_) => {
                            return Err(invalid(format!("input '{input}' is not numeric")));
                        }
                        None => {
                            return Err(invalid(format!("input '{input}' has no source")));
                        }
                    }
                }
            }
            DerivedRule::KeywordCount { keywords } => {
                if keywords.iter().all(|k| k.trim().is_empty()) {
                    return Err(invalid("keyword_count needs at least one keyword".to_string()));
                }
            }
        }
    }
    Ok(())
}

fn check_constraints(
    constraints: &[Constraint],
    sources: &BTreeMap<&str, Source>,
) -> Result<(), SchemaError> {
    let mut seen_ids = BTreeSet::new();
    // variable -> (type, constraint that first declared it)
    let mut declared: BTreeMap<&str, (VarType, &str)> = BTreeMap::new();

    for constraint in constraints {
        if constraint.id.trim().is_empty() {
            return Err(SchemaError::missing("constraints[].id"));
        }
        if !seen_ids.insert(constraint.id.as_str()) {
            return Err(SchemaError::DuplicateConstraintId {
                id: constraint.id.clone(),
            });
        }

        for decl in &constraint.variables {
            match declared.get(decl.name.as_str()) {
                Some((existing, owner)) if *existing != decl.var_type => {
                    return Err(SchemaError::type_mismatch(
                        format!("variable '{}'", decl.name),
                        format!(
                            "declared {existing} by '{owner}' and {} by '{}'",
                            decl.var_type, constraint.id
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    declared.insert(decl.name.as_str(), (decl.var_type, constraint.id.as_str()));
                }
            }
        }

        for variable in constraint.formula.variables() {
            let Some(var_type) = constraint.declared_type(variable) else {
                return Err(SchemaError::UndeclaredVariable {
                    constraint_id: constraint.id.clone(),
                    variable: variable.to_string(),
                });
            };
            let Some(source) = sources.get(variable) else {
                return Err(SchemaError::UnboundVariable {
                    constraint_id: constraint.id.clone(),
                    variable: variable.to_string(),
                });
            };
            if source.kind() != kind_of(var_type) {
                return Err(SchemaError::type_mismatch(
                    format!("constraint '{}'", constraint.id),
                    format!(
                        "'{variable}' is declared {var_type} but its source produces a {}",
                        source.kind()
                    ),
                ));
            }
        }

        check_expr(&constraint.formula, constraint)?;
    }
    Ok(())
}

fn term_kind(term: &Term, constraint: &Constraint) -> Option<ValueKind> {
    match term {
        Term::Var(name) => constraint.declared_type(name).map(kind_of),
        Term::Lit(value) => Some(value.kind()),
    }
}

fn check_expr(expr: &Expr, constraint: &Constraint) -> Result<(), SchemaError> {
    let context = || format!("constraint '{}'", constraint.id);
    match expr {
        Expr::And { args } | Expr::Or { args } => {
            if args.is_empty() {
                return Err(SchemaError::InvalidFormula {
                    constraint_id: constraint.id.clone(),
                    message: "conjunction or disjunction without operands".to_string(),
                });
            }
            args.iter().try_for_each(|a| check_expr(a, constraint))
        }
        Expr::Not { arg } => check_expr(arg, constraint),
        Expr::Implies { left, right } => {
            check_expr(left, constraint)?;
            check_expr(right, constraint)
        }
        Expr::Var { name } => match constraint.declared_type(name) {
            Some(VarType::Bool) => Ok(()),
            Some(other) => Err(SchemaError::type_mismatch(
                context(),
                format!("'{name}' is {other} and cannot be used as a condition"),
            )),
            None => Err(SchemaError::UndeclaredVariable {
                constraint_id: constraint.id.clone(),
                variable: name.clone(),
            }),
        },
        Expr::Compare { cmp, left, right } => {
            let (Some(lk), Some(rk)) = (term_kind(left, constraint), term_kind(right, constraint))
            else {
                return Err(SchemaError::InvalidFormula {
                    constraint_id: constraint.id.clone(),
                    message: format!("comparison '{expr}' references an undeclared variable"),
                });
            };
            match (lk, rk) {
                (ValueKind::Number, ValueKind::Number) => Ok(()),
                (ValueKind::Bool, ValueKind::Bool) if cmp.is_equality() => Ok(()),
                (ValueKind::Bool, ValueKind::Bool) => Err(SchemaError::type_mismatch(
                    context(),
                    format!("booleans only support = and ≠, found '{expr}'"),
                )),
                _ => Err(SchemaError::type_mismatch(
                    context(),
                    format!("cannot compare {lk} with {rk} in '{expr}'"),
                )),
            }
        }
        Expr::Lit { .. } => Ok(()),
    }
}

fn compile(variable: &str, rule: &ExtractorRule) -> Result<CompiledExtractor, ExtractionError> {
    let matcher = match rule {
        ExtractorRule::Int { pattern } => compile_pattern(variable, pattern, PatternType::Int)?,
        ExtractorRule::Real { pattern } => compile_pattern(variable, pattern, PatternType::Real)?,
        ExtractorRule::Money { pattern } => compile_pattern(variable, pattern, PatternType::Money)?,
        ExtractorRule::Boolean { keywords } => {
            let keywords = normalize_keywords(keywords);
            if keywords.is_empty() {
                return Err(ExtractionError::EmptyKeywords {
                    variable: variable.to_string(),
                });
            }
            Matcher::Keywords { keywords }
        }
    };

    Ok(CompiledExtractor {
        variable: variable.to_string(),
        matcher,
    })
}

fn compile_pattern(
    variable: &str,
    pattern: &str,
    value_type: PatternType,
) -> Result<Matcher, ExtractionError> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ExtractionError::InvalidPattern {
            variable: variable.to_string(),
            source,
        })?;
    // Group 0 is the whole match.
    let found = regex.captures_len() - 1;
    if found != 1 {
        return Err(ExtractionError::CaptureGroups {
            variable: variable.to_string(),
            found,
        });
    }
    Ok(Matcher::Pattern { value_type, regex })
}

/// Lowercase, drop blanks and duplicates, keep first-seen order.
pub(crate) fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for k in keywords {
        let k = k.trim().to_lowercase();
        if !k.is_empty() && !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

fn fingerprint_ontology(ontology: &Ontology) -> Result<String, SchemaError> {
    let canonical = serde_json::to_vec(ontology).map_err(|e| SchemaError::InvalidDocument {
        message: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

use crate::formula::Expr;
use aare_types::{Number, Value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A versioned rule-set: constraints plus the rules that produce their variables.
///
/// Immutable once loaded; `name` + `version` identify a revision.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ontology {
    pub name: String,
    pub version: String,
    pub description: String,
    pub constraints: Vec<Constraint>,

    /// Text extractors keyed by the variable they produce.
    pub extractors: BTreeMap<String, ExtractorRule>,

    /// Variables computed after the extractor pass.
    pub derived: BTreeMap<String, DerivedRule>,

    /// Variables with a fixed value.
    pub constants: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Constraint {
    pub id: String,
    pub category: String,
    pub description: String,
    pub formula: Expr,
    pub variables: Vec<VariableDecl>,
    pub error_message: String,
    pub citation: String,
}

impl Constraint {
    pub fn declared_type(&self, name: &str) -> Option<VarType> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.var_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VariableDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Int,
    #[serde(alias = "float")]
    Real,
    #[serde(alias = "boolean")]
    Bool,
    Money,
}

impl VarType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, VarType::Bool)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VarType::Int => "int",
            VarType::Real => "real",
            VarType::Bool => "bool",
            VarType::Money => "money",
        };
        f.write_str(s)
    }
}

/// Declarative extraction rule, in the persisted shape:
/// `{"type": "money", "pattern": "..."}` or `{"type": "boolean", "keywords": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractorRule {
    Int {
        pattern: String,
    },
    #[serde(rename = "float", alias = "real")]
    Real {
        pattern: String,
    },
    Money {
        pattern: String,
    },
    #[serde(alias = "bool")]
    Boolean {
        keywords: Vec<String>,
    },
}

/// Coercion applied to a pattern extractor's capture group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternType {
    Int,
    Real,
    Money,
}

impl ExtractorRule {
    /// Pattern and coercion for pattern rules; `None` for keyword rules.
    pub fn pattern(&self) -> Option<(&str, PatternType)> {
        match self {
            ExtractorRule::Int { pattern } => Some((pattern, PatternType::Int)),
            ExtractorRule::Real { pattern } => Some((pattern, PatternType::Real)),
            ExtractorRule::Money { pattern } => Some((pattern, PatternType::Money)),
            ExtractorRule::Boolean { .. } => None,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ExtractorRule::Boolean { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ExtractorRule::Int { .. } => "int",
            ExtractorRule::Real { .. } => "float",
            ExtractorRule::Money { .. } => "money",
            ExtractorRule::Boolean { .. } => "boolean",
        }
    }
}

fn default_ratio_scale() -> Number {
    Number::from_i64(1)
}

/// Value computed after extraction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedRule {
    /// `numerator / denominator * scale`; absent when an input is absent or the denominator is 0.
    Ratio {
        numerator: String,
        denominator: String,
        #[serde(default = "default_ratio_scale")]
        scale: Number,
    },
    /// Number of distinct keywords present in the text. Always definite.
    KeywordCount { keywords: Vec<String> },
}

impl DerivedRule {
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            DerivedRule::Ratio {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_str(), denominator.as_str()],
            DerivedRule::KeywordCount { .. } => Vec::new(),
        }
    }
}

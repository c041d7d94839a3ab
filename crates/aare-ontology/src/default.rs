//! Built-in mortgage compliance ontology, usable with no external input.

use crate::formula::{CompareOp, Expr, Term};
use crate::model::{Constraint, DerivedRule, ExtractorRule, Ontology, VarType, VariableDecl};
use aare_types::Number;
use aare_types::ids;
use std::collections::BTreeMap;

pub fn default_ontology() -> Ontology {
    Ontology {
        name: ids::DEFAULT_ONTOLOGY_NAME.to_string(),
        version: ids::DEFAULT_ONTOLOGY_VERSION.to_string(),
        description: "U.S. Mortgage Compliance - Core constraints".to_string(),
        constraints: vec![
            atr_qm_dti(),
            hoepa_high_cost(),
            udaap_no_guarantees(),
            hpml_escrow(),
            reg_b_adverse(),
        ],
        extractors: extractors(),
        derived: derived(),
        constants: BTreeMap::new(),
    }
}

fn var(name: &str, var_type: VarType) -> VariableDecl {
    VariableDecl {
        name: name.to_string(),
        var_type,
    }
}

fn cmp(name: &str, op: CompareOp, value: i64) -> Expr {
    Expr::compare(Term::var(name), op, Term::num(value))
}

fn atr_qm_dti() -> Constraint {
    Constraint {
        id: ids::CONSTRAINT_ATR_QM_DTI.to_string(),
        category: "ATR/QM".to_string(),
        description: "Debt-to-income ratio requirements".to_string(),
        formula: Expr::or(vec![
            cmp("dti", CompareOp::Le, 43),
            cmp("compensating_factors", CompareOp::Ge, 2),
        ]),
        variables: vec![
            var("dti", VarType::Real),
            var("compensating_factors", VarType::Int),
        ],
        error_message: "DTI exceeds 43% without sufficient compensating factors".to_string(),
        citation: "12 CFR § 1026.43(c)".to_string(),
    }
}

fn hoepa_high_cost() -> Constraint {
    Constraint {
        id: ids::CONSTRAINT_HOEPA_HIGH_COST.to_string(),
        category: "HOEPA".to_string(),
        description: "High-cost mortgage counseling requirement".to_string(),
        formula: Expr::or(vec![
            cmp("fee_percentage", CompareOp::Lt, 8),
            Expr::var("counseling_disclosed"),
        ]),
        variables: vec![
            var("fee_percentage", VarType::Real),
            var("counseling_disclosed", VarType::Bool),
        ],
        error_message: "HOEPA triggered - counseling disclosure required".to_string(),
        citation: "12 CFR § 1026.32".to_string(),
    }
}

fn udaap_no_guarantees() -> Constraint {
    Constraint {
        id: ids::CONSTRAINT_UDAAP_NO_GUARANTEES.to_string(),
        category: "UDAAP".to_string(),
        description: "Prohibition on guarantee language".to_string(),
        formula: Expr::not(Expr::and(vec![
            Expr::var("has_guarantee"),
            Expr::var("has_approval"),
        ])),
        variables: vec![
            var("has_guarantee", VarType::Bool),
            var("has_approval", VarType::Bool),
        ],
        error_message: "Cannot guarantee approval".to_string(),
        citation: "12 CFR § 1036.3".to_string(),
    }
}

fn hpml_escrow() -> Constraint {
    Constraint {
        id: ids::CONSTRAINT_HPML_ESCROW.to_string(),
        category: "Escrow".to_string(),
        description: "Escrow requirements based on FICO".to_string(),
        formula: Expr::or(vec![
            cmp("credit_score", CompareOp::Ge, 620),
            Expr::not(Expr::var("escrow_waived")),
        ]),
        variables: vec![
            var("credit_score", VarType::Int),
            var("escrow_waived", VarType::Bool),
        ],
        error_message: "Cannot waive escrow with FICO < 620".to_string(),
        citation: "12 CFR § 1026.35(b)".to_string(),
    }
}

fn reg_b_adverse() -> Constraint {
    Constraint {
        id: ids::CONSTRAINT_REG_B_ADVERSE.to_string(),
        category: "Regulation B".to_string(),
        description: "Adverse action disclosure requirements".to_string(),
        formula: Expr::implies(Expr::var("is_denial"), Expr::var("has_specific_reason")),
        variables: vec![
            var("is_denial", VarType::Bool),
            var("has_specific_reason", VarType::Bool),
        ],
        error_message: "Must disclose specific denial reason".to_string(),
        citation: "12 CFR § 1002.9".to_string(),
    }
}

fn keywords(words: &[&str]) -> ExtractorRule {
    ExtractorRule::Boolean {
        keywords: words.iter().map(|w| w.to_string()).collect(),
    }
}

fn extractors() -> BTreeMap<String, ExtractorRule> {
    let rules = [
        (
            "dti",
            ExtractorRule::Real {
                pattern: r"dti[:\s~]*(\d+(?:\.\d+)?)".to_string(),
            },
        ),
        (
            "credit_score",
            ExtractorRule::Int {
                pattern: r"(?:fico|credit score)[:\s]*(\d{3})".to_string(),
            },
        ),
        (
            "fees",
            ExtractorRule::Money {
                pattern: r"\$?([\d,]+)k?\s*(?:fees?|costs?)".to_string(),
            },
        ),
        (
            "loan_amount",
            ExtractorRule::Money {
                pattern: r"\$?([\d,]+)k?\s*(?:loan|mortgage)".to_string(),
            },
        ),
        ("has_guarantee", keywords(&["guaranteed", "100%", "definitely"])),
        ("has_approval", keywords(&["approved", "approve"])),
        ("counseling_disclosed", keywords(&["counseling"])),
        (
            "escrow_waived",
            keywords(&["escrow waived", "waive escrow", "skip escrow"]),
        ),
        ("is_denial", keywords(&["denied", "cannot approve"])),
        (
            "has_specific_reason",
            keywords(&["credit", "income", "dti", "debt", "score"]),
        ),
    ];
    rules
        .into_iter()
        .map(|(name, rule)| (name.to_string(), rule))
        .collect()
}

fn derived() -> BTreeMap<String, DerivedRule> {
    let mut out = BTreeMap::new();
    out.insert(
        "fee_percentage".to_string(),
        DerivedRule::Ratio {
            numerator: "fees".to_string(),
            denominator: "loan_amount".to_string(),
            scale: Number::from_i64(100),
        },
    );
    out.insert(
        "compensating_factors".to_string(),
        DerivedRule::KeywordCount {
            keywords: [
                "reserves",
                "residual income",
                "low ltv",
                "stable employment",
                "minimal payment shock",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        },
    );
    out
}

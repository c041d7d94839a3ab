//! The `explain` use case: describe one constraint of an ontology.

use crate::store::OntologyStore;
use aare_ontology::{DerivedRule, ExtractorRule, ValidatedOntology, VarType};
use aare_types::Value;
use anyhow::Context;

/// Where a constraint variable gets its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableSource {
    Extractor(ExtractorRule),
    Derived(DerivedRule),
    Constant(Value),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintExplanation {
    pub ontology_name: String,
    pub ontology_version: String,
    pub id: String,
    pub category: String,
    pub description: String,
    pub formula: String,
    pub variables: Vec<(String, VarType, VariableSource)>,
    pub error_message: String,
    pub citation: String,
}

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(ConstraintExplanation),
    /// Unknown id; includes the ids the ontology does define.
    NotFound {
        identifier: String,
        available: Vec<String>,
    },
}

/// Look up a constraint by id in the named ontology.
pub fn run_explain(
    store: &OntologyStore,
    ontology_name: &str,
    constraint_id: &str,
) -> anyhow::Result<ExplainOutput> {
    let ontology = store
        .get(ontology_name)
        .with_context(|| format!("load ontology '{ontology_name}'"))?;
    Ok(explain_in(&ontology, constraint_id))
}

fn explain_in(ontology: &ValidatedOntology, constraint_id: &str) -> ExplainOutput {
    let Some(constraint) = ontology.constraint(constraint_id) else {
        return ExplainOutput::NotFound {
            identifier: constraint_id.to_string(),
            available: ontology.constraints().iter().map(|c| c.id.clone()).collect(),
        };
    };

    let model = ontology.ontology();
    let variables = constraint
        .variables
        .iter()
        .filter_map(|decl| {
            let name = decl.name.as_str();
            let source = if let Some(rule) = model.extractors.get(name) {
                VariableSource::Extractor(rule.clone())
            } else if let Some(rule) = model.derived.get(name) {
                VariableSource::Derived(rule.clone())
            } else {
                VariableSource::Constant(model.constants.get(name)?.clone())
            };
            Some((decl.name.clone(), decl.var_type, source))
        })
        .collect();

    ExplainOutput::Found(ConstraintExplanation {
        ontology_name: ontology.name().to_string(),
        ontology_version: ontology.version().to_string(),
        id: constraint.id.clone(),
        category: constraint.category.clone(),
        description: constraint.description.clone(),
        formula: constraint.formula.to_string(),
        variables,
        error_message: constraint.error_message.clone(),
        citation: constraint.citation.clone(),
    })
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &ConstraintExplanation) -> String {
    let mut out = String::new();

    out.push_str(&exp.id);
    out.push('\n');
    out.push_str(&"=".repeat(exp.id.chars().count()));
    out.push_str("\n\n");
    out.push_str(&format!(
        "Ontology: {} v{}\n",
        exp.ontology_name, exp.ontology_version
    ));
    if !exp.category.is_empty() {
        out.push_str(&format!("Category: {}\n", exp.category));
    }
    out.push('\n');
    if !exp.description.is_empty() {
        out.push_str(&exp.description);
        out.push_str("\n\n");
    }
    out.push_str("Formula\n");
    out.push_str("-------\n");
    out.push_str(&exp.formula);
    out.push_str("\n\n");
    out.push_str("Variables\n");
    out.push_str("---------\n");
    for (name, var_type, source) in &exp.variables {
        out.push_str(&format!("  - {name} ({var_type}): {}\n", describe_source(source)));
    }
    out.push('\n');
    out.push_str(&format!("Message: {}\n", exp.error_message));
    if !exp.citation.is_empty() {
        out.push_str(&format!("Citation: {}\n", exp.citation));
    }

    out
}

fn describe_source(source: &VariableSource) -> String {
    match source {
        VariableSource::Extractor(rule) => match (rule, rule.pattern()) {
            (_, Some((pattern, _))) => {
                format!("{} pattern /{pattern}/", rule.type_name())
            }
            (ExtractorRule::Boolean { keywords }, None) => {
                format!("any keyword of [{}]", keywords.join(", "))
            }
            _ => rule.type_name().to_string(),
        },
        VariableSource::Derived(DerivedRule::Ratio {
            numerator,
            denominator,
            scale,
        }) => format!("derived {numerator} / {denominator} * {scale}"),
        VariableSource::Derived(DerivedRule::KeywordCount { keywords }) => {
            format!("derived count of [{}]", keywords.join(", "))
        }
        VariableSource::Constant(value) => format!("constant {value}"),
    }
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, available: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown constraint id: {identifier}\n\n"));
    out.push_str("Available constraint ids:\n");
    for id in available {
        out.push_str(&format!("  - {id}\n"));
    }

    out
}

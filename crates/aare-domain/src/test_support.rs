use aare_ontology::{Constraint, Expr, ValidatedOntology, VarType, VariableDecl, default_ontology, validate};
use aare_types::Number;

pub fn default_validated() -> ValidatedOntology {
    validate(default_ontology()).expect("default ontology validates")
}

pub fn number(s: &str) -> Number {
    Number::parse(s).expect("valid number literal")
}

pub fn num_var(name: &str) -> VariableDecl {
    VariableDecl {
        name: name.to_string(),
        var_type: VarType::Real,
    }
}

pub fn bool_var(name: &str) -> VariableDecl {
    VariableDecl {
        name: name.to_string(),
        var_type: VarType::Bool,
    }
}

pub fn constraint(id: &str, formula: Expr, variables: Vec<VariableDecl>) -> Constraint {
    Constraint {
        id: id.to_string(),
        category: "Test".to_string(),
        description: format!("{id} description"),
        formula,
        variables,
        error_message: format!("{id} violated"),
        citation: "n/a".to_string(),
    }
}

use aare_types::{AbsenceReason, ExtractionRecord, ExtractionSource, Snapshot, Value};
use std::collections::BTreeMap;

/// One variable's state after extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Present(Value),
    Absent(AbsenceReason),
}

impl Binding {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Binding::Present(v) => Some(v),
            Binding::Absent(_) => None,
        }
    }
}

/// Variable name to value-or-absence for a single call. Built fresh each time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    bindings: BTreeMap<String, Binding>,
    records: Vec<ExtractionRecord>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, variable: &str, source: ExtractionSource, binding: Binding) {
        let absence = match &binding {
            Binding::Present(_) => None,
            Binding::Absent(reason) => Some(reason.clone()),
        };
        self.records.push(ExtractionRecord {
            variable: variable.to_string(),
            source,
            present: absence.is_none(),
            absence,
        });
        self.bindings.insert(variable.to_string(), binding);
    }

    pub fn get(&self, variable: &str) -> Option<&Binding> {
        self.bindings.get(variable)
    }

    /// Present value, or `None` when absent or unknown to this assignment.
    pub fn value(&self, variable: &str) -> Option<&Value> {
        self.get(variable).and_then(Binding::value)
    }

    pub fn is_present(&self, variable: &str) -> bool {
        self.value(variable).is_some()
    }

    /// Extraction records in the order variables were bound.
    pub fn records(&self) -> &[ExtractionRecord] {
        &self.records
    }

    /// Every bound variable, absent ones as `None`.
    pub fn snapshot(&self) -> Snapshot {
        self.bindings
            .iter()
            .map(|(name, b)| (name.clone(), b.value().cloned()))
            .collect()
    }

    /// Values of the named variables only.
    pub fn snapshot_of<'a>(&self, variables: impl IntoIterator<Item = &'a str>) -> Snapshot {
        variables
            .into_iter()
            .map(|name| (name.to_string(), self.value(name).cloned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_is_recorded_with_reason() {
        let mut a = Assignment::new();
        a.bind("dti", ExtractionSource::Pattern, Binding::Absent(AbsenceReason::NoMatch));
        a.bind("flag", ExtractionSource::Keyword, Binding::Present(Value::Bool(false)));

        assert!(!a.is_present("dti"));
        assert_eq!(a.value("flag"), Some(&Value::Bool(false)));
        assert_eq!(a.records().len(), 2);
        assert!(!a.records()[0].present);
        assert_eq!(a.records()[0].absence, Some(AbsenceReason::NoMatch));

        let snap = a.snapshot();
        assert_eq!(snap.get("dti"), Some(&None));
        assert_eq!(snap.get("flag"), Some(&Some(Value::Bool(false))));
    }

    #[test]
    fn snapshot_of_unknown_name_is_absent() {
        let a = Assignment::new();
        let snap = a.snapshot_of(["missing"]);
        assert_eq!(snap.get("missing"), Some(&None));
    }
}

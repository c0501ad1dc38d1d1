//! Filter criteria and sort orders.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use super::Record;

/// Field equality criteria (all must match).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria(BTreeMap<String, Value>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, expected)| record.get(field) == Some(expected))
    }

    /// JSON object form used on the wire.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

/// Sort order on a single field. Wire form is `field` or `-field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(raw),
        }
    }

    pub fn to_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }

    /// Compare two records; records missing the field sort first ascending
    /// and last descending.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = compare_values(a.get(&self.field), b.get(&self.field));
        if self.descending { ord.reverse() } else { ord }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn criteria_require_every_field() {
        let c = Criteria::new().eq("status", "pending").eq("kind", "duel");

        assert!(c.matches(&record(json!({"status": "pending", "kind": "duel", "x": 1}))));
        assert!(!c.matches(&record(json!({"status": "pending"}))));
        assert!(Criteria::new().matches(&record(json!({}))));
    }

    #[test]
    fn sort_wire_form_round_trips() {
        assert_eq!(Sort::parse("-created_at"), Sort::desc("created_at"));
        assert_eq!(Sort::parse("name").to_param(), "name");
        assert_eq!(Sort::desc("last_seen").to_param(), "-last_seen");
    }

    #[test]
    fn descending_puts_missing_values_last() {
        let sort = Sort::desc("created_at");
        let mut records = vec![
            record(json!({"id": "a"})),
            record(json!({"id": "b", "created_at": "2024-01-02"})),
            record(json!({"id": "c", "created_at": "2024-01-03"})),
        ];
        records.sort_by(|a, b| sort.compare(a, b));

        let ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}

use serde::{Deserialize, Serialize};

use crate::models::CompletionRecord;

/// Append-only history of completions, most recent first.
///
/// There is deliberately no way to edit or remove an entry: records outlive
/// the tasks and notes they were taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    records: Vec<CompletionRecord>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: CompletionRecord) {
        self.records.insert(0, event);
    }

    pub fn entries(&self) -> &[CompletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str) -> CompletionRecord {
        CompletionRecord {
            id: id.to_string(),
            text: format!("task {id}"),
            completed_at: "2024-05-01T08:00:00Z".parse().unwrap(),
            completed_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    #[test]
    fn newest_record_comes_first() {
        let mut ledger = CompletionLedger::new();
        ledger.record(record("a"));
        ledger.record(record("b"));

        let ids: Vec<_> = ledger.entries().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn serializes_as_a_bare_sequence() {
        let mut ledger = CompletionLedger::new();
        ledger.record(record("a"));
        let json = serde_json::to_value(&ledger).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], "a");
    }
}

//! Inference trace
//!
//! An append-only record of every rule evaluation in a session, whether the
//! rule matched or not. The explanation facility renders it for display.

use serde::{Deserialize, Serialize};

use crate::derived::{DerivedField, Derivation};
use crate::memory::WriteOutcome;
use crate::rules::{Phase, Rule};

/// One proposed write and what working memory did with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactWrite {
    pub value: Derivation,
    #[serde(flatten)]
    pub outcome: WriteOutcome,
}

/// A later rule tried to overwrite an already-set field
///
/// Not an error: the write is refused and the event is kept for the
/// explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConflictEvent {
    pub rule_id: String,
    pub iteration: u32,
    pub field: DerivedField,
    pub existing: Derivation,
    pub attempted: Derivation,
}

/// A single rule evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub rule_id: String,
    pub phase: Phase,
    pub description: String,
    pub evaluated_at_iteration: u32,
    pub matched: bool,
    /// True when at least one write changed working memory
    pub fired: bool,
    pub reason: String,
    pub writes: Vec<FactWrite>,
}

impl TraceEntry {
    /// Entry for a rule whose condition did not hold
    pub fn not_matched(rule: &Rule, iteration: u32) -> Self {
        Self {
            rule_id: rule.id.to_string(),
            phase: rule.phase,
            description: rule.description.to_string(),
            evaluated_at_iteration: iteration,
            matched: false,
            fired: false,
            reason: format!("condition not met: {}", rule.description),
            writes: Vec::new(),
        }
    }

    /// Entry for a rule whose condition held, with the outcome of each write
    pub fn matched(rule: &Rule, iteration: u32, writes: Vec<FactWrite>) -> Self {
        let fired = writes.iter().any(|w| w.outcome.changed());
        let reason = if writes.is_empty() {
            "matched; no writes proposed".to_string()
        } else {
            writes
                .iter()
                .map(describe_write)
                .collect::<Vec<_>>()
                .join("; ")
        };

        Self {
            rule_id: rule.id.to_string(),
            phase: rule.phase,
            description: rule.description.to_string(),
            evaluated_at_iteration: iteration,
            matched: true,
            fired,
            reason,
            writes,
        }
    }

    /// Refused writes of this entry as conflict events
    pub fn conflicts(&self) -> impl Iterator<Item = RuleConflictEvent> + '_ {
        self.writes.iter().filter_map(move |write| match write.outcome {
            WriteOutcome::Refused { existing } => Some(RuleConflictEvent {
                rule_id: self.rule_id.clone(),
                iteration: self.evaluated_at_iteration,
                field: write.value.field(),
                existing,
                attempted: write.value,
            }),
            _ => None,
        })
    }
}

fn describe_write(write: &FactWrite) -> String {
    match write.outcome {
        WriteOutcome::Set => format!("set {}", write.value),
        WriteOutcome::Unchanged => format!("no change, {} already holds", write.value),
        WriteOutcome::Refused { existing } => {
            format!("conflict: kept {}, refused {}", existing, write.value)
        }
        WriteOutcome::Forbidden { writer } => format!(
            "refused: {} rules may not write {}",
            writer,
            write.value.field()
        ),
    }
}

/// Ordered trace of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceTrace {
    entries: Vec<TraceEntry>,
}

impl InferenceTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for rules that changed working memory
    pub fn fired(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(|e| e.fired)
    }

    /// All refused writes, in evaluation order
    pub fn conflicts(&self) -> Vec<RuleConflictEvent> {
        self.entries.iter().flat_map(|e| e.conflicts()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::{ClaimDecision, FraudRisk};

    fn rule() -> Rule {
        Rule::new(
            "TST-001",
            Phase::Approval,
            "test rule",
            |_, _| true,
            |_, _| Vec::new(),
        )
    }

    #[test]
    fn test_not_matched_entry() {
        let entry = TraceEntry::not_matched(&rule(), 1);
        assert!(!entry.matched);
        assert!(!entry.fired);
        assert_eq!(entry.reason, "condition not met: test rule");
    }

    #[test]
    fn test_matched_entry_with_conflict() {
        let existing = Derivation::Decision(ClaimDecision::UnderInvestigation);
        let attempted = Derivation::Decision(ClaimDecision::Approved);
        let entry = TraceEntry::matched(
            &rule(),
            1,
            vec![FactWrite {
                value: attempted,
                outcome: WriteOutcome::Refused { existing },
            }],
        );

        assert!(entry.matched);
        assert!(!entry.fired);
        assert_eq!(
            entry.reason,
            "conflict: kept claim_decision = under_investigation, refused claim_decision = approved"
        );

        let conflicts: Vec<_> = entry.conflicts().collect();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].field, DerivedField::ClaimDecision);
        assert_eq!(conflicts[0].existing, existing);
    }

    #[test]
    fn test_fired_requires_a_set() {
        let entry = TraceEntry::matched(
            &rule(),
            2,
            vec![FactWrite {
                value: Derivation::Fraud(FraudRisk::Low),
                outcome: WriteOutcome::Unchanged,
            }],
        );
        assert!(entry.matched);
        assert!(!entry.fired);
        assert_eq!(entry.reason, "no change, fraud_risk = low already holds");
    }
}

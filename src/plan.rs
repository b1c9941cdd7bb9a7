// src/plan.rs

//! Teardown plans for cascading deletes
//!
//! aptly offers no transactions, so a cascade is computed up front as an
//! ordered list of steps and then executed one step at a time. Each step's
//! outcome is recorded in a [`TeardownReport`].

use serde::Serialize;
use std::fmt;

/// One delete step in a teardown plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeardownStep {
    /// Drop a snapshot; `strict` steps fail the plan instead of being skipped
    DropSnapshot { name: String, strict: bool },
    /// Drop a publication entry
    DropPublication { name: String },
}

impl TeardownStep {
    pub fn name(&self) -> &str {
        match self {
            TeardownStep::DropSnapshot { name, .. } => name,
            TeardownStep::DropPublication { name } => name,
        }
    }
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownStep::DropSnapshot { name, .. } => write!(f, "snapshot {}", name),
            TeardownStep::DropPublication { name } => write!(f, "publication {}", name),
        }
    }
}

/// What happened to a step when the plan ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    Skipped(String),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Done => f.write_str("dropped"),
            StepOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

/// Ordered list of steps computed before execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownPlan {
    pub steps: Vec<TeardownStep>,
}

impl TeardownPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: TeardownStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: TeardownStep) {
        self.steps.push(step);
    }
}

/// Outcome of each executed step, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub entries: Vec<(TeardownStep, StepOutcome)>,
}

impl TeardownReport {
    pub fn record(&mut self, step: TeardownStep, outcome: StepOutcome) {
        self.entries.push((step, outcome));
    }

    /// Extend with another report's entries
    pub fn absorb(&mut self, other: TeardownReport) {
        self.entries.extend(other.entries);
    }

    pub fn dropped(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, o)| *o == StepOutcome::Done)
            .map(|(s, _)| s.name())
            .collect()
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, StepOutcome::Skipped(_)))
            .map(|(s, _)| s.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_preserves_order() {
        let plan = TeardownPlan::new()
            .with_step(TeardownStep::DropSnapshot {
                name: "a-main-1".to_string(),
                strict: true,
            })
            .with_step(TeardownStep::DropSnapshot {
                name: "a-amd64-main-1".to_string(),
                strict: false,
            });
        let names: Vec<_> = plan.steps.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a-main-1", "a-amd64-main-1"]);
    }

    #[test]
    fn test_report_partitions_outcomes() {
        let mut report = TeardownReport::default();
        report.record(
            TeardownStep::DropPublication {
                name: "1/a".to_string(),
            },
            StepOutcome::Done,
        );
        report.record(
            TeardownStep::DropSnapshot {
                name: "a-amd64-main-1".to_string(),
                strict: false,
            },
            StepOutcome::Skipped("published by 2/a".to_string()),
        );
        assert_eq!(report.dropped(), vec!["1/a"]);
        assert_eq!(report.skipped(), vec!["a-amd64-main-1"]);
        assert_eq!(report.entries[1].1.to_string(), "skipped (published by 2/a)");
    }

    #[test]
    fn test_report_serializes() {
        let mut report = TeardownReport::default();
        report.record(
            TeardownStep::DropSnapshot {
                name: "s".to_string(),
                strict: true,
            },
            StepOutcome::Done,
        );
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"drop_snapshot\""));
        assert!(json.contains("\"done\""));
    }
}

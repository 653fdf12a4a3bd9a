//! Function-level comparison of two snapshots
//!
//! A pure function of two snapshot maps. Every key present on both sides is
//! a changed function and gets a verdict; neutral ones whose archetypes did
//! not move are only counted.

use super::snapshot::NodeSnapshot;
use crate::archetypes::Archetype;
use serde::Serialize;
use std::collections::BTreeMap;

// ── Stress thresholds ──────────────────────────────────────────

pub const COMPLEXITY_THRESHOLD: i64 = 3;
pub const FAN_OUT_THRESHOLD: i64 = 2;
pub const FAN_IN_THRESHOLD: i64 = 5;
pub const CROSS_MODULE_THRESHOLD: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Stressed,
    Improved,
    Neutral,
}

/// `after - before` for each tracked metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricDelta {
    pub complexity: i64,
    pub fan_in: i64,
    pub fan_out: i64,
    pub cross_module_fan_out: i64,
    pub lines_of_code: i64,
}

impl MetricDelta {
    fn between(before: &NodeSnapshot, after: &NodeSnapshot) -> Self {
        let d = |a: usize, b: usize| b as i64 - a as i64;
        Self {
            complexity: d(before.complexity, after.complexity),
            fan_in: d(before.fan_in, after.fan_in),
            fan_out: d(before.fan_out, after.fan_out),
            cross_module_fan_out: d(before.cross_module_fan_out, after.cross_module_fan_out),
            lines_of_code: d(before.lines_of_code, after.lines_of_code),
        }
    }

    fn crosses_stress(&self) -> bool {
        self.complexity >= COMPLEXITY_THRESHOLD
            || self.fan_out >= FAN_OUT_THRESHOLD
            || self.fan_in >= FAN_IN_THRESHOLD
            || self.cross_module_fan_out >= CROSS_MODULE_THRESHOLD
    }

    fn crosses_relief(&self) -> bool {
        self.complexity <= -COMPLEXITY_THRESHOLD
            || self.fan_out <= -FAN_OUT_THRESHOLD
            || self.fan_in <= -FAN_IN_THRESHOLD
            || self.cross_module_fan_out <= -CROSS_MODULE_THRESHOLD
    }

    /// `2|Δcomplexity| + |ΔfanOut| + |ΔcrossModuleFanOut| + 0.5|ΔfanIn|`
    pub fn severity(&self) -> f64 {
        2.0 * self.complexity.abs() as f64
            + self.fan_out.abs() as f64
            + self.cross_module_fan_out.abs() as f64
            + 0.5 * self.fan_in.abs() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDiff {
    pub key: String,
    pub status: DiffStatus,
    /// Only for changed functions
    pub verdict: Option<Verdict>,
    pub delta: MetricDelta,
    pub severity: f64,
    pub gained: Vec<Archetype>,
    pub lost: Vec<Archetype>,
    pub before: Option<NodeSnapshot>,
    pub after: Option<NodeSnapshot>,
}

impl FunctionDiff {
    pub fn gained_concerning(&self) -> bool {
        self.gained.iter().any(|a| a.is_concerning())
    }

    fn rank(&self) -> u8 {
        match (self.status, self.verdict) {
            (DiffStatus::Changed, Some(Verdict::Stressed)) => 0,
            (DiffStatus::Added, _) => 1,
            (DiffStatus::Changed, Some(Verdict::Improved)) => 2,
            (DiffStatus::Changed, _) => 3,
            (DiffStatus::Removed, _) => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub stressed: usize,
    pub improved: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffResult {
    pub before_ref: String,
    pub after_ref: String,
    pub diffs: Vec<FunctionDiff>,
    pub summary: DiffSummary,
}

impl DiffResult {
    pub fn has_stressed(&self) -> bool {
        self.summary.stressed > 0
    }
}

/// Compares snapshot maps
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compare(
        &self,
        before_ref: &str,
        after_ref: &str,
        before: &BTreeMap<String, NodeSnapshot>,
        after: &BTreeMap<String, NodeSnapshot>,
    ) -> DiffResult {
        let mut summary = DiffSummary::default();
        let mut diffs = Vec::new();

        for (key, new) in after {
            match before.get(key) {
                Some(old) => {
                    let diff = Self::changed(key, old, new);
                    match diff.verdict {
                        Some(Verdict::Stressed) => summary.stressed += 1,
                        Some(Verdict::Improved) => summary.improved += 1,
                        _ if diff.gained.is_empty() && diff.lost.is_empty() => {
                            summary.unchanged += 1;
                            continue;
                        }
                        _ => {}
                    }
                    diffs.push(diff);
                }
                None => {
                    summary.added += 1;
                    diffs.push(FunctionDiff {
                        key: key.clone(),
                        status: DiffStatus::Added,
                        verdict: None,
                        delta: MetricDelta::default(),
                        severity: 0.0,
                        gained: new.archetypes.iter().copied().collect(),
                        lost: Vec::new(),
                        before: None,
                        after: Some(new.clone()),
                    });
                }
            }
        }

        for (key, old) in before {
            if after.contains_key(key) {
                continue;
            }
            summary.removed += 1;
            diffs.push(FunctionDiff {
                key: key.clone(),
                status: DiffStatus::Removed,
                verdict: None,
                delta: MetricDelta::default(),
                severity: 0.0,
                gained: Vec::new(),
                lost: old.archetypes.iter().copied().collect(),
                before: Some(old.clone()),
                after: None,
            });
        }

        // Stable sort keeps encounter order within a group
        diffs.sort_by(|a, b| {
            a.rank().cmp(&b.rank()).then_with(|| match a.rank() {
                0 => b.severity.total_cmp(&a.severity),
                1 => b.gained_concerning().cmp(&a.gained_concerning()),
                _ => std::cmp::Ordering::Equal,
            })
        });

        DiffResult {
            before_ref: before_ref.to_string(),
            after_ref: after_ref.to_string(),
            diffs,
            summary,
        }
    }

    fn changed(key: &str, old: &NodeSnapshot, new: &NodeSnapshot) -> FunctionDiff {
        let delta = MetricDelta::between(old, new);
        let gained: Vec<Archetype> = new.archetypes.difference(&old.archetypes).copied().collect();
        let lost: Vec<Archetype> = old.archetypes.difference(&new.archetypes).copied().collect();

        let verdict = if delta.crosses_stress() || gained.iter().any(|a| a.is_concerning()) {
            Verdict::Stressed
        } else if delta.crosses_relief() || lost.iter().any(|a| a.is_concerning()) {
            Verdict::Improved
        } else {
            Verdict::Neutral
        };

        FunctionDiff {
            key: key.to_string(),
            status: DiffStatus::Changed,
            verdict: Some(verdict),
            severity: delta.severity(),
            delta,
            gained,
            lost,
            before: Some(old.clone()),
            after: Some(new.clone()),
        }
    }
}

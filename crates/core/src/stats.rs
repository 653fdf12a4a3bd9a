//! Percentile distributions of per-function metrics
//!
//! Every threshold the archetype detectors use is a percentile of the
//! analysed code base itself, so a "high" fan-in means high for this project.

use crate::graph::CallGraph;
use serde::Serialize;

/// Summary of one metric over all functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub p50: f64,
    pub p75: f64,
    pub p85: f64,
    pub p90: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl Distribution {
    /// Nearest-rank percentiles: the value at `floor(p * (n - 1))` of the
    /// ascending sample. An empty sample gives all zeros.
    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let at = |p: f64| values[((p * (n - 1) as f64).floor() as usize).min(n - 1)];

        Self {
            p50: at(0.50),
            p75: at(0.75),
            p85: at(0.85),
            p90: at(0.90),
            p95: at(0.95),
            max: values[n - 1],
            mean: values.iter().sum::<f64>() / n as f64,
            count: n,
        }
    }
}

/// Distributions for the fixed metric set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStats {
    pub fan_in: Distribution,
    pub fan_out: Distribution,
    pub complexity: Distribution,
    pub lines_of_code: Distribution,
    pub params: Distribution,
    pub cross_module_fan_out: Distribution,
    pub cross_module_ratio: Distribution,
}

impl GraphStats {
    pub fn compute(graph: &CallGraph) -> Self {
        let metrics: Vec<_> = graph
            .functions()
            .filter_map(|n| graph.metrics(n.id()))
            .collect();

        let collect = |f: fn(&crate::graph::FunctionMetrics) -> f64| {
            Distribution::from_values(metrics.iter().map(f).collect())
        };

        Self {
            fan_in: collect(|m| m.fan_in as f64),
            fan_out: collect(|m| m.fan_out as f64),
            complexity: collect(|m| m.complexity as f64),
            lines_of_code: collect(|m| m.lines_of_code as f64),
            params: collect(|m| m.params as f64),
            cross_module_fan_out: collect(|m| m.cross_module_fan_out as f64),
            cross_module_ratio: collect(|m| m.cross_module_ratio),
        }
    }
}

/// Position of `value` between `floor` and `max`, clamped to `[0, 1]`.
/// A degenerate range (`max <= floor`) gives 0.
pub fn normalize(value: f64, floor: f64, max: f64) -> f64 {
    let range = max - floor;
    if range <= 0.0 || !range.is_finite() {
        return 0.0;
    }
    ((value - floor) / range).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_rank_percentiles() {
        let d = Distribution::from_values((1..=10).map(f64::from).collect());
        // floor(0.5 * 9) = 4 -> 5th value
        assert_eq!(d.p50, 5.0);
        assert_eq!(d.p75, 7.0);
        assert_eq!(d.p90, 9.0);
        assert_eq!(d.p95, 9.0);
        assert_eq!(d.max, 10.0);
        assert_eq!(d.mean, 5.5);
        assert_eq!(d.count, 10);
    }

    #[test]
    fn empty_sample_is_all_zero() {
        assert_eq!(Distribution::from_values(Vec::new()), Distribution::default());
    }

    #[test]
    fn single_value() {
        let d = Distribution::from_values(vec![4.0]);
        assert_eq!(d.p50, 4.0);
        assert_eq!(d.p95, 4.0);
        assert_eq!(d.max, 4.0);
    }

    #[test]
    fn normalize_guards_degenerate_range() {
        assert_eq!(normalize(5.0, 5.0, 5.0), 0.0);
        assert_eq!(normalize(5.0, 6.0, 2.0), 0.0);
        assert_eq!(normalize(7.5, 5.0, 10.0), 0.5);
        assert_eq!(normalize(20.0, 5.0, 10.0), 1.0);
        assert_eq!(normalize(1.0, 5.0, 10.0), 0.0);
    }
}

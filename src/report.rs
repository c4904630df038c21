//! Summaries of a grouping result for display.

use crate::result::GroupingResult;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub capacity: u32,
    /// Members per planned place, in percent
    pub fill: f64,
    /// Mean cost of the members, `None` for an empty group
    pub mean_cost: Option<f64>,
}

/// Count, fill and mean cost of every group, in table column order.
pub fn summarize(result: &GroupingResult) -> Vec<GroupSummary> {
    result
        .groups()
        .iter()
        .zip(result.capacities())
        .map(|(group, &capacity)| {
            let costs = result
                .evaluation()
                .get(group)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            GroupSummary {
                group: group.clone(),
                count: costs.len(),
                capacity,
                fill: if capacity == 0 {
                    0.0
                } else {
                    100.0 * costs.len() as f64 / capacity as f64
                },
                mean_cost: mean(costs),
            }
        })
        .collect()
}

/// Mean cost over all subjects.
pub fn overall_mean_cost(result: &GroupingResult) -> Option<f64> {
    let all: Vec<f64> = result.evaluation().values().flatten().copied().collect();
    mean(&all)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Format the grouping into a human readable String (e.g. to print it to stdout).
///
/// The output format will look like
/// ```text
/// ===== Group name (2/6, 33%, mean cost 1.50) =====
/// Anton
/// Bertalotta
///
/// ===== Another group (0/6, 0%) =====
/// ```
pub fn format_summary(result: &GroupingResult) -> String {
    let mut out = String::new();
    for summary in summarize(result) {
        write!(
            out,
            "===== {} ({}/{}, {:.0}%",
            summary.group, summary.count, summary.capacity, summary.fill
        )
        .unwrap();
        if let Some(m) = summary.mean_cost {
            write!(out, ", mean cost {:.2}", m).unwrap();
        }
        writeln!(out, ") =====").unwrap();
        for subject in result.members(&summary.group) {
            writeln!(out, "{}", subject).unwrap();
        }
        out.push('\n');
    }
    if let Some(m) = overall_mean_cost(result) {
        writeln!(out, "Mean cost over all subjects: {:.2}", m).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Options, Problem};

    fn solved() -> GroupingResult {
        let problem: Problem = serde_yaml::from_str(
            "table:\n  columns: [id, A, B]\n  rows:\n    - [s1, 1, 2]\n    - [s2, 1, 3]\n    - [s3, 3, 1]\n",
        )
        .unwrap();
        Problem {
            options: Options {
                excess_space: 0.0,
                ..problem.options
            },
            ..problem
        }
        .solve()
        .unwrap()
    }

    #[test]
    fn summaries() {
        let result = solved();
        let summary = summarize(&result);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].group, "A");
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].capacity, 2);
        assert_eq!(summary[0].fill, 100.0);
        assert_eq!(summary[0].mean_cost, Some(1.0));
        assert_eq!(summary[1].count, 1);
        assert_eq!(summary[1].fill, 50.0);
        assert_eq!(overall_mean_cost(&result), Some(1.0));
    }

    #[test]
    fn text_output() {
        let text = format_summary(&solved());
        assert!(text.contains("===== A (2/2, 100%, mean cost 1.00) =====\ns1\ns2\n"), "{}", text);
        assert!(text.contains("===== B (1/2, 50%, mean cost 1.00) =====\ns3\n"), "{}", text);
    }
}

//! Turning the solver's 0/1 solution back into named groups.

use crate::cost::CostMatrix;
use crate::pregroup::Reconciliation;
use crate::program::RawSolution;
use crate::table::Table;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One line of the flat export: a subject and the group it ended up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub subject: String,
    pub group: String,
}

/// The outcome of one solve. Created once and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingResult {
    groups: Vec<String>,
    grouped: BTreeMap<String, Vec<String>>,
    evaluation: BTreeMap<String, Vec<f64>>,
    capacities: Vec<u32>,
    adjusted_capacities: Vec<u32>,
    excess_space: f64,
    cost_levels: Vec<f64>,
    objective: f64,
    raw_solution: RawSolution,
    input: Table,
    export: Vec<ExportRow>,
}

/// Everything the reconstruction needs besides the solution itself.
pub struct Inputs<'a> {
    /// The original table
    pub input: &'a Table,
    /// Cost matrix over all subjects, pre-grouped ones included
    pub full: &'a CostMatrix,
    /// Cost matrix the program was built from
    pub solved: &'a CostMatrix,
    pub reconciliation: &'a Reconciliation,
    /// Planned capacities before pre-grouping
    pub capacities: &'a [u32],
    pub excess_space: f64,
}

/// Name the groups and subjects of `raw`, merge the pre-grouped subjects back in and evaluate
/// the costs of every group.
///
/// Within a group, solved subjects come first in table order, followed by the pre-grouped ones
/// in the order they were given.
pub fn reconstruct(raw: RawSolution, inputs: Inputs<'_>) -> GroupingResult {
    let groups = inputs.solved.groups().to_vec();

    let mut grouped: BTreeMap<String, Vec<String>> =
        groups.iter().map(|g| (g.clone(), Vec::new())).collect();
    let mut objective = 0.0;
    for (g, s) in raw.0.iter() {
        objective += inputs.solved.get(*g, *s);
        if let Some(members) = grouped.get_mut(&groups[*g]) {
            members.push(inputs.solved.subjects()[*s].clone());
        }
    }

    // Merge by group name, the pre-grouped lists are indexed like the table's columns
    for (name, pre) in inputs
        .input
        .groups()
        .iter()
        .zip(inputs.reconciliation.pre_assigned.iter())
    {
        if let Some(members) = grouped.get_mut(name) {
            members.extend(pre.iter().cloned());
        }
    }

    let evaluation = groups
        .iter()
        .enumerate()
        .map(|(g, name)| {
            let costs = grouped[name]
                .iter()
                .map(|s| inputs.full.cost_of(g, s).unwrap_or(f64::NAN))
                .collect();
            (name.clone(), costs)
        })
        .collect();

    let group_of: HashMap<&str, &str> = grouped
        .iter()
        .flat_map(|(g, members)| members.iter().map(move |s| (s.as_str(), g.as_str())))
        .collect();
    let export = inputs
        .input
        .subjects()
        .iter()
        .filter_map(|s| {
            group_of.get(s.as_str()).map(|g| ExportRow {
                subject: s.clone(),
                group: g.to_string(),
            })
        })
        .collect();

    GroupingResult {
        groups,
        grouped,
        evaluation,
        capacities: inputs.capacities.to_vec(),
        adjusted_capacities: inputs.reconciliation.capacities.clone(),
        excess_space: inputs.excess_space,
        cost_levels: inputs.full.distinct_levels(),
        objective,
        raw_solution: raw,
        input: inputs.input.clone(),
        export,
    }
}

impl GroupingResult {
    /// Group names in table column order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Members of every group, pre-grouped subjects included.
    pub fn grouped(&self) -> &BTreeMap<String, Vec<String>> {
        &self.grouped
    }

    pub fn members(&self, group: &str) -> &[String] {
        self.grouped.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Costs of every group's members, in the same order as `grouped()`.
    ///
    /// Pre-grouped members are included, with their costs taken from the full imputed matrix, so
    /// each list already covers the whole group.
    pub fn evaluation(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.evaluation
    }

    /// Planned capacity of every group, before pre-grouped subjects are taken off.
    pub fn capacities(&self) -> &[u32] {
        &self.capacities
    }

    /// Capacities the solver worked with.
    pub fn adjusted_capacities(&self) -> &[u32] {
        &self.adjusted_capacities
    }

    pub fn excess_space(&self) -> f64 {
        self.excess_space
    }

    /// Distinct cost values of the input after imputation, ascending.
    pub fn cost_levels(&self) -> &[f64] {
        &self.cost_levels
    }

    /// Total cost of the solved (not pre-grouped) subjects.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn raw_solution(&self) -> &RawSolution {
        &self.raw_solution
    }

    pub fn input(&self) -> &Table {
        &self.input
    }

    pub fn export(&self) -> &[ExportRow] {
        &self.export
    }

    pub fn group_of(&self, subject: &str) -> Option<&str> {
        self.export
            .iter()
            .find(|row| row.subject == subject)
            .map(|row| row.group.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pregroup::{GroupRef, PreAssignment, PreGrouping, reconcile};

    fn table() -> Table {
        let s = |v: &[&str]| v.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Table::new(
            s(&["id", "B", "A"]),
            vec![
                s(&["p", "1", "2"]),
                s(&["q", "2", ""]),
                s(&["r", "2", "1"]),
                s(&["t", "1", "2"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn names_merges_and_evaluates() {
        let table = table();
        let full = CostMatrix::from_table(&table, None);
        let pre = PreGrouping(vec![PreAssignment {
            subject: "q".to_string(),
            group: GroupRef::Name("A".to_string()),
        }]);
        let reconciliation = reconcile(&table, &pre, &[2, 2]).unwrap();
        let solved = full.select_subjects(reconciliation.remaining.subjects());
        assert_eq!(solved.subjects(), &["p", "r", "t"]);

        // p -> B, r -> A, t -> B
        let raw = RawSolution(vec![(0, 0), (0, 2), (1, 1)]);
        let result = reconstruct(
            raw.clone(),
            Inputs {
                input: &table,
                full: &full,
                solved: &solved,
                reconciliation: &reconciliation,
                capacities: &[2, 2],
                excess_space: 0.0,
            },
        );

        assert_eq!(result.groups(), &["B", "A"]);
        assert_eq!(result.members("B"), &["p", "t"]);
        assert_eq!(result.members("A"), &["r", "q"]);
        assert_eq!(result.evaluation()["A"], vec![1.0, 2.0]);
        assert_eq!(result.evaluation()["B"], vec![1.0, 1.0]);
        assert_eq!(result.objective(), 3.0);
        assert_eq!(result.adjusted_capacities(), &[2, 1]);
        assert_eq!(result.cost_levels(), &[1.0, 2.0]);
        assert_eq!(result.raw_solution(), &raw);

        let exported: Vec<(&str, &str)> = result
            .export()
            .iter()
            .map(|r| (r.subject.as_str(), r.group.as_str()))
            .collect();
        assert_eq!(exported, vec![("p", "B"), ("q", "A"), ("r", "A"), ("t", "B")]);
        assert_eq!(result.group_of("q"), Some("A"));
    }
}

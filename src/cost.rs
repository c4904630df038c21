use crate::table::Table;
use log::{debug, warn};
use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

/// Groups × subjects matrix of assignment costs, every cell defined.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    groups: Vec<String>,
    subjects: Vec<String>,
    /// `costs[[g, s]]` is the penalty of putting subject `s` into group `g`
    costs: ndarray::Array2<f64>,
}

impl CostMatrix {
    /// Transpose the table into a groups × subjects matrix, filling missing costs with
    /// `missing_cost`, or with the number of groups if no value is given. The number of groups is
    /// one worse than the last rank of a complete priority list.
    pub fn from_table(table: &Table, missing_cost: Option<f64>) -> CostMatrix {
        let fill = missing_cost.unwrap_or(table.num_groups() as f64);
        let mut imputed = 0usize;
        let costs = ndarray::Array2::from_shape_fn(
            (table.num_groups(), table.num_subjects()),
            |(g, s)| {
                table.cost(s, g).unwrap_or_else(|| {
                    imputed += 1;
                    fill
                })
            },
        );
        if imputed > 0 {
            warn!("{} missing costs were set to {}", imputed, fill);
        }
        debug!(
            "Built {}x{} cost matrix",
            table.num_groups(),
            table.num_subjects()
        );
        CostMatrix {
            groups: table.groups().to_vec(),
            subjects: table.subjects().to_vec(),
            costs,
        }
    }

    /// Restrict the subject axis to `subjects`, keeping their order. Unknown ids are skipped.
    pub fn select_subjects(&self, subjects: &[String]) -> CostMatrix {
        let columns: Vec<usize> = subjects
            .iter()
            .filter_map(|id| self.subject_index(id))
            .collect();
        CostMatrix {
            groups: self.groups.clone(),
            subjects: columns.iter().map(|s| self.subjects[*s].clone()).collect(),
            costs: self.costs.select(ndarray::Axis(1), &columns),
        }
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn num_subjects(&self) -> usize {
        self.subjects.len()
    }

    pub fn get(&self, g: usize, s: usize) -> f64 {
        self.costs[[g, s]]
    }

    pub fn subject_index(&self, subject: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s == subject)
    }

    /// Cost of `subject` in group `g`, looked up by id.
    pub fn cost_of(&self, g: usize, subject: &str) -> Option<f64> {
        self.subject_index(subject).map(|s| self.costs[[g, s]])
    }

    /// All distinct cost values, ascending.
    pub fn distinct_levels(&self) -> Vec<f64> {
        self.costs
            .iter()
            .map(|c| OrderedFloat(*c))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|c| c.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let s = |v: &[&str]| v.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Table::new(
            s(&["id", "A", "B", "C"]),
            vec![s(&["x", "1", "", "3"]), s(&["y", "2", "1", "NA"])],
        )
        .unwrap()
    }

    #[test]
    fn transposes_and_imputes_group_count() {
        let m = CostMatrix::from_table(&table(), None);
        assert_eq!(m.num_groups(), 3);
        assert_eq!(m.num_subjects(), 2);
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.get(2, 1), 3.0);
        assert_eq!(m.cost_of(1, "y"), Some(1.0));
        assert_eq!(m.cost_of(1, "z"), None);
    }

    #[test]
    fn imputes_configured_value() {
        let m = CostMatrix::from_table(&table(), Some(10.0));
        assert_eq!(m.get(1, 0), 10.0);
        assert_eq!(m.distinct_levels(), vec![1.0, 2.0, 3.0, 10.0]);
    }

    #[test]
    fn selects_subjects() {
        let m = CostMatrix::from_table(&table(), None).select_subjects(&["y".to_string()]);
        assert_eq!(m.subjects(), &["y"]);
        assert_eq!(m.get(0, 0), 2.0);
        assert_eq!(m.get(2, 0), 3.0);
    }
}

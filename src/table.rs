//! The tabular input: one row per subject, the first column holding the subject id and every
//! further column holding the subject's cost (or priority rank) for one group.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cell contents that count as "no stated cost for this group".
const MISSING_MARKERS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

/// A validated subjects × groups cost table. Missing costs are kept as `None` until the cost
/// matrix is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct Table {
    subject_column: String,
    groups: Vec<String>,
    subjects: Vec<String>,
    costs: Vec<Vec<Option<f64>>>,
}

/// Serialized form of a table as it appears in YAML/JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Cell>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Text(String),
}

impl Table {
    /// Build a table from a header row and raw text rows, e.g. as read from a CSV file.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table> {
        let parsed = rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let subject = cells.next().unwrap_or_default();
                let costs = cells.map(|c| parse_cost(&c)).collect::<Result<Vec<_>>>()?;
                Ok::<_, Error>((subject, costs))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_parsed(header, parsed)
    }

    fn from_parsed(
        mut header: Vec<String>,
        rows: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Table> {
        if header.len() < 2 {
            return Err(Error::DataFormat(format!(
                "expected a subject column and at least one group column, got {} column(s)",
                header.len()
            )));
        }
        let subject_column = header.remove(0);
        let groups = header;

        let mut seen_groups = HashSet::new();
        for g in groups.iter() {
            if !seen_groups.insert(g.as_str()) {
                return Err(Error::DataFormat(format!("group '{}' appears twice", g)));
            }
        }

        let mut subjects = Vec::with_capacity(rows.len());
        let mut costs = Vec::with_capacity(rows.len());
        let mut seen_subjects = HashSet::new();
        for (line, (subject, row)) in rows.into_iter().enumerate() {
            if row.len() != groups.len() {
                return Err(Error::DataFormat(format!(
                    "row {} has {} cost column(s), expected {}",
                    line + 1,
                    row.len(),
                    groups.len()
                )));
            }
            let subject = subject.trim().to_string();
            if subject.is_empty() {
                return Err(Error::DataFormat(format!("row {} has no subject id", line + 1)));
            }
            if !seen_subjects.insert(subject.clone()) {
                return Err(Error::DataFormat(format!(
                    "subject ids must be unique, '{}' appears twice",
                    subject
                )));
            }
            subjects.push(subject);
            costs.push(row);
        }

        Ok(Table {
            subject_column,
            groups,
            subjects,
            costs,
        })
    }

    pub fn subject_column(&self) -> &str {
        &self.subject_column
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

    /// Stated cost of subject `s` for group `g`, `None` if missing.
    pub fn cost(&self, s: usize, g: usize) -> Option<f64> {
        self.costs[s][g]
    }

    pub fn subject_index(&self, subject: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s == subject)
    }

    /// The same table without the given subjects. Unknown ids are ignored.
    pub fn without_subjects(&self, removed: &HashSet<&str>) -> Table {
        let (subjects, costs): (Vec<String>, Vec<Vec<Option<f64>>>) = self
            .subjects
            .iter()
            .zip(self.costs.iter())
            .filter(|(s, _)| !removed.contains(s.as_str()))
            .map(|(s, c)| (s.clone(), c.clone()))
            .unzip();
        Table {
            subject_column: self.subject_column.clone(),
            groups: self.groups.clone(),
            subjects,
            costs,
        }
    }
}

fn parse_cost(cell: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if MISSING_MARKERS.contains(&cell) {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) => checked_cost(v),
        Err(_) => Err(Error::DataFormat(format!("'{}' is not a numeric cost", cell))),
    }
}

/// NaN counts as missing, infinite costs are rejected.
fn checked_cost(v: f64) -> Result<Option<f64>> {
    if v.is_nan() {
        Ok(None)
    } else if v.is_infinite() {
        Err(Error::DataFormat(format!("cost {} is not finite", v)))
    } else {
        Ok(Some(v))
    }
}

impl TryFrom<RawTable> for Table {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Table> {
        let rows = raw
            .rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let subject = match cells.next().flatten() {
                    Some(Cell::Text(s)) => s,
                    Some(Cell::Number(n)) => n.to_string(),
                    None => String::new(),
                };
                let costs = cells
                    .map(|cell| match cell {
                        None => Ok(None),
                        Some(Cell::Number(n)) => checked_cost(n),
                        Some(Cell::Text(s)) => parse_cost(&s),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok::<_, Error>((subject, costs))
            })
            .collect::<Result<Vec<_>>>()?;
        Table::from_parsed(raw.columns, rows)
    }
}

impl From<Table> for RawTable {
    fn from(table: Table) -> RawTable {
        let mut columns = vec![table.subject_column];
        columns.extend(table.groups);
        let rows = table
            .subjects
            .into_iter()
            .zip(table.costs)
            .map(|(s, costs)| {
                std::iter::once(Some(Cell::Text(s)))
                    .chain(costs.into_iter().map(|c| c.map(Cell::Number)))
                    .collect()
            })
            .collect();
        RawTable { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_text_rows() {
        let table = Table::new(
            strings(&["name", "A", "B"]),
            vec![strings(&["ann", "1", "2"]), strings(&["bob", "NA", " 3 "])],
        )
        .unwrap();
        assert_eq!(table.subject_column(), "name");
        assert_eq!(table.groups(), &["A", "B"]);
        assert_eq!(table.subjects(), &["ann", "bob"]);
        assert_eq!(table.cost(0, 1), Some(2.0));
        assert_eq!(table.cost(1, 0), None);
        assert_eq!(table.cost(1, 1), Some(3.0));
    }

    #[test]
    fn rejects_too_few_columns() {
        let err = Table::new(strings(&["name"]), vec![strings(&["ann"])]).unwrap_err();
        assert!(matches!(err, Error::DataFormat(_)));
    }

    #[test]
    fn rejects_duplicate_subjects() {
        let err = Table::new(
            strings(&["name", "A"]),
            vec![strings(&["ann", "1"]), strings(&["ann", "2"])],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DataFormat(_)));
    }

    #[test]
    fn rejects_ragged_rows_and_text_costs() {
        let ragged = Table::new(strings(&["name", "A", "B"]), vec![strings(&["ann", "1"])]);
        assert!(matches!(ragged, Err(Error::DataFormat(_))));
        let text = Table::new(strings(&["name", "A"]), vec![strings(&["ann", "high"])]);
        assert!(matches!(text, Err(Error::DataFormat(_))));
        let inf = Table::new(strings(&["name", "A"]), vec![strings(&["ann", "inf"])]);
        assert!(matches!(inf, Err(Error::DataFormat(_))));
    }

    #[test]
    fn yaml_form_with_nulls() {
        let yaml = "columns: [id, A, B]\nrows:\n  - [s1, 1, ~]\n  - [s2, NA, 2]\n";
        let table: Table = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.cost(0, 1), None);
        assert_eq!(table.cost(1, 0), None);
        assert_eq!(table.cost(1, 1), Some(2.0));

        let again: Table = serde_yaml::from_str(&serde_yaml::to_string(&table).unwrap()).unwrap();
        assert_eq!(table, again);
    }

    #[test]
    fn drops_subjects() {
        let table = Table::new(
            strings(&["name", "A"]),
            vec![strings(&["ann", "1"]), strings(&["bob", "2"]), strings(&["cat", "3"])],
        )
        .unwrap();
        let reduced = table.without_subjects(&HashSet::from(["bob"]));
        assert_eq!(reduced.subjects(), &["ann", "cat"]);
        assert_eq!(reduced.cost(1, 0), Some(3.0));
    }
}

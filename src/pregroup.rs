//! Manual pre-assignment of subjects to groups, fixed before the solver runs.

use crate::error::{Error, Result};
use crate::table::Table;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A reference to a group, either by its 1-based column position or by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

impl GroupRef {
    /// Resolve to the 0-based group index of `groups`.
    ///
    /// A name that matches no group but reads as a positive integer is taken as a position, since
    /// group references read from text files are always strings.
    pub fn resolve(&self, groups: &[String]) -> Result<usize> {
        let index = match self {
            GroupRef::Index(i) => Some(*i),
            GroupRef::Name(name) => match groups.iter().position(|g| g == name) {
                Some(g) => return Ok(g),
                None => name.trim().parse::<usize>().ok(),
            },
        };
        match index {
            Some(i) if i >= 1 && i <= groups.len() => Ok(i - 1),
            _ => Err(Error::Configuration(format!(
                "pre-grouping refers to unknown group {}",
                self
            ))),
        }
    }
}

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupRef::Index(i) => write!(f, "#{}", i),
            GroupRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreAssignment {
    pub subject: String,
    pub group: GroupRef,
}

/// Ordered list of pre-assigned subjects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreGrouping(pub Vec<PreAssignment>);

impl PreGrouping {
    /// Build from the rows of a two-column table (subject, group reference).
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<PreGrouping> {
        rows.into_iter()
            .enumerate()
            .map(|(line, row)| match <[String; 2]>::try_from(row) {
                Ok([subject, group]) => Ok(PreAssignment {
                    subject: subject.trim().to_string(),
                    group: GroupRef::Name(group.trim().to_string()),
                }),
                Err(row) => Err(Error::DataFormat(format!(
                    "pre-grouping row {} has {} columns, expected 2",
                    line + 1,
                    row.len()
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(PreGrouping)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of removing the pre-assigned subjects from the optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The input table without the pre-assigned subjects.
    pub remaining: Table,
    /// Capacity left in every group after the pre-assigned subjects took their places.
    pub capacities: Vec<u32>,
    /// Pre-assigned subjects of every group, indexed like the table's groups.
    pub pre_assigned: Vec<Vec<String>>,
}

/// Take the pre-assigned subjects out of the working set and reduce the group capacities
/// accordingly.
///
/// Unknown groups or subjects, subjects listed twice and groups receiving more pre-assigned
/// subjects than they have places are all rejected, so none of them reach the solver.
pub fn reconcile(
    table: &Table,
    pre_grouping: &PreGrouping,
    capacities: &[u32],
) -> Result<Reconciliation> {
    let mut pre_assigned = vec![Vec::new(); table.num_groups()];
    let mut fixed = HashSet::new();
    for entry in pre_grouping.0.iter() {
        let g = entry.group.resolve(table.groups())?;
        if table.subject_index(&entry.subject).is_none() {
            return Err(Error::Configuration(format!(
                "pre-grouped subject '{}' is not in the input table",
                entry.subject
            )));
        }
        if !fixed.insert(entry.subject.as_str()) {
            return Err(Error::Configuration(format!(
                "subject '{}' is pre-grouped twice",
                entry.subject
            )));
        }
        pre_assigned[g].push(entry.subject.clone());
    }

    let capacities = capacities
        .iter()
        .zip(pre_assigned.iter())
        .zip(table.groups())
        .map(|((cap, subjects), group)| {
            cap.checked_sub(subjects.len() as u32).ok_or_else(|| {
                Error::Configuration(format!(
                    "{} subjects are pre-grouped into '{}', which only has {} places",
                    subjects.len(),
                    group,
                    cap
                ))
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    let remaining = table.without_subjects(&fixed);
    info!(
        "Pre-grouped {} subjects, {} left to assign",
        fixed.len(),
        remaining.num_subjects()
    );
    Ok(Reconciliation {
        remaining,
        capacities,
        pre_assigned,
    })
}

//! Assign subjects to capacity-limited groups by their costs (or priority ranks) for every group,
//! using a 0/1 linear program.

pub mod backend;
pub mod capacity;
pub mod cost;
pub mod error;
pub mod io;
pub mod pregroup;
pub mod program;
pub mod report;
pub mod result;
pub mod table;

pub use backend::{CbcBackend, MilpBackend, SolverParams};
pub use capacity::CapClasses;
pub use error::{Error, Result};
pub use pregroup::{GroupRef, PreAssignment, PreGrouping};
pub use result::GroupingResult;
pub use table::Table;

use cost::CostMatrix;
use log::info;
use program::{AssignmentProgram, RawSolution};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Base capacity of the groups
    pub cap_classes: CapClasses,
    /// Percentage by which every group's capacity exceeds its base capacity
    pub excess_space: f64,
    /// Seed for the solver's internal randomization
    pub seed: u32,
    /// Let the solver print its log
    pub verbose: bool,
    /// Solver time limit in seconds
    pub time_limit: Option<f64>,
    /// Cost used where the table has none; the number of groups if not set
    pub missing_cost: Option<f64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            cap_classes: CapClasses::Equal,
            excess_space: 20.0,
            seed: 0,
            verbose: false,
            time_limit: None,
            missing_cost: None,
        }
    }
}

impl Options {
    fn solver_params(&self) -> SolverParams {
        SolverParams {
            seed: self.seed,
            verbose: self.verbose,
            time_limit: self.time_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub table: Table,
    #[serde(default)]
    pub pre_grouping: PreGrouping,
    #[serde(default)]
    pub options: Options,
}

impl Problem {
    pub fn new(table: Table) -> Problem {
        Problem {
            table,
            pre_grouping: PreGrouping::default(),
            options: Options::default(),
        }
    }

    pub fn solve(&self) -> Result<GroupingResult> {
        self.solve_with(&CbcBackend)
    }

    /// Plan capacities, take out the pre-grouped subjects, solve the assignment program for
    /// the others and put the result together.
    ///
    /// All input checks happen before the solver is called. Nothing is returned unless every
    /// subject ends up in exactly one group.
    pub fn solve_with<B: MilpBackend>(&self, backend: &B) -> Result<GroupingResult> {
        let table = &self.table;
        let options = &self.options;
        if let Some(c) = options.missing_cost {
            if !c.is_finite() {
                return Err(Error::Configuration(format!(
                    "missing cost must be a finite number, got {}",
                    c
                )));
            }
        }

        let capacities = capacity::plan_capacities(
            table.num_subjects(),
            table.num_groups(),
            &options.cap_classes,
            options.excess_space,
        )?;
        let reconciliation = pregroup::reconcile(table, &self.pre_grouping, &capacities)?;

        let full = CostMatrix::from_table(table, options.missing_cost);
        let solved = full.select_subjects(reconciliation.remaining.subjects());
        let program = AssignmentProgram::new(&solved, &reconciliation.capacities)?;
        program.check_capacity()?;

        let raw = if program.num_subjects() == 0 {
            RawSolution::default()
        } else {
            info!(
                "Assigning {} subjects to {} groups with capacities {:?}",
                program.num_subjects(),
                program.num_groups(),
                program.capacities()
            );
            backend.solve(&program, &options.solver_params())?
        };
        program.verify(&raw)?;
        info!("Found assignment with total cost {}", program.objective_value(&raw));

        Ok(result::reconstruct(
            raw,
            result::Inputs {
                input: table,
                full: &full,
                solved: &solved,
                reconciliation: &reconciliation,
                capacities: &capacities,
                excess_space: options.excess_space,
            },
        ))
    }
}

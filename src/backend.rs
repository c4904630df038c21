//! Solver adapters turning an `AssignmentProgram` into a `RawSolution`.

use crate::error::{Error, Result};
use crate::program::{AssignmentProgram, LinearConstraint, RawSolution, Sense};
use good_lp::Solution as LpSolution;
use good_lp::constraint::Constraint;
use good_lp::solvers::coin_cbc::{CoinCbcProblem, coin_cbc};
use good_lp::{Expression, SolutionStatus, SolverModel, Variable, variable, variables};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Settings passed through to the solver untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverParams {
    /// Seed for the solver's internal randomization
    pub seed: u32,
    /// Let the solver print its log
    pub verbose: bool,
    /// Give up after this many seconds
    pub time_limit: Option<f64>,
}

/// A mixed-integer solver that can solve an assignment program to optimality.
pub trait MilpBackend {
    fn solve(&self, program: &AssignmentProgram, params: &SolverParams) -> Result<RawSolution>;
}

/// COIN-OR CBC through `good_lp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CbcBackend;

impl MilpBackend for CbcBackend {
    fn solve(&self, program: &AssignmentProgram, params: &SolverParams) -> Result<RawSolution> {
        let start = Instant::now();

        let mut problem_vars = variables!();
        let x: Vec<Variable> = (0..program.num_variables())
            .map(|_| problem_vars.add(variable().binary()))
            .collect();
        debug!(
            "Created {} binary variables for {} groups and {} subjects",
            x.len(),
            program.num_groups(),
            program.num_subjects()
        );

        let objective = program
            .objective()
            .iter()
            .zip(x.iter())
            .fold(Expression::from(0.0), |sum, (&cost, &var)| sum + var * cost);
        let model = create_model(problem_vars.minimise(objective).using(coin_cbc), params);
        let model = program
            .constraints()
            .fold(model, |m, c| m.with(to_constraint(&c, &x)));

        info!("Starting MILP solver...");
        let solution = model
            .solve()
            .map_err(|e| Error::InfeasibleAssignment(format!("solver failed: {}", e)))?;
        info!("Solver finished in {:.2?}", start.elapsed());
        check_status(solution.status())?;

        // Binary variables come back as floats close to 0 or 1
        let pairs = x
            .iter()
            .enumerate()
            .filter(|(_, var)| solution.value(**var) > 0.5)
            .map(|(v, _)| program.pair(v))
            .collect();
        Ok(RawSolution(pairs))
    }
}

fn create_model(mut model: CoinCbcProblem, params: &SolverParams) -> CoinCbcProblem {
    model.set_parameter("randomCbcSeed", &params.seed.to_string());
    model.set_parameter("loglevel", if params.verbose { "1" } else { "0" });
    if let Some(seconds) = params.time_limit {
        model.set_parameter("seconds", &seconds.to_string());
    }
    model
}

/// Only a proven optimum counts as a solution. A time-limited incumbent is rejected.
fn check_status(status: SolutionStatus) -> Result<()> {
    match status {
        SolutionStatus::Optimal => Ok(()),
        other => {
            warn!("Solver stopped without proving optimality: {:?}", other);
            Err(Error::InfeasibleAssignment(format!(
                "solver stopped with status {:?} before finding an optimal assignment",
                other
            )))
        }
    }
}

fn to_constraint(constraint: &LinearConstraint, x: &[Variable]) -> Constraint {
    let lhs: Expression = constraint.variables.iter().map(|v| x[*v]).sum();
    match constraint.sense {
        Sense::LessEq => lhs.leq(constraint.rhs),
        Sense::Eq => lhs.eq(constraint.rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostMatrix;
    use crate::table::Table;

    fn program(rows: &[[&str; 3]], capacities: &[u32]) -> AssignmentProgram {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        let header = vec!["id".to_string(), "g1".to_string(), "g2".to_string()];
        let table = Table::new(header, rows).unwrap();
        AssignmentProgram::new(&CostMatrix::from_table(&table, None), capacities).unwrap()
    }

    #[test]
    fn solves_to_optimum() {
        let p = program(
            &[["s1", "1", "4"], ["s2", "2", "3"], ["s3", "3", "2"], ["s4", "4", "1"]],
            &[2, 2],
        );
        let solution = CbcBackend.solve(&p, &SolverParams::default()).unwrap();
        assert_eq!(solution, RawSolution(vec![(0, 0), (0, 1), (1, 2), (1, 3)]));
        assert_eq!(p.objective_value(&solution), 6.0);
        assert!(p.verify(&solution).is_ok());
    }

    #[test]
    fn binding_capacity_moves_subjects() {
        // Everybody prefers g1, which has a single place. s1 loses the most by moving.
        let p = program(&[["s1", "1", "5"], ["s2", "1", "2"], ["s3", "1", "4"]], &[1, 3]);
        let solution = CbcBackend.solve(&p, &SolverParams::default()).unwrap();
        assert_eq!(p.objective_value(&solution), 7.0);
        assert!(solution.0.contains(&(0, 0)));
    }

    #[test]
    fn infeasible_program() {
        let p = program(&[["s1", "1", "2"], ["s2", "1", "2"], ["s3", "2", "1"]], &[1, 1]);
        let err = CbcBackend.solve(&p, &SolverParams::default()).unwrap_err();
        assert!(matches!(err, Error::InfeasibleAssignment(_)));
    }

    #[test]
    fn time_limited_result_is_rejected() {
        assert!(check_status(SolutionStatus::Optimal).is_ok());
        let err = check_status(SolutionStatus::TimeLimit).unwrap_err();
        assert!(matches!(err, Error::InfeasibleAssignment(_)), "{}", err);
        assert!(err.to_string().contains("TimeLimit"), "{}", err);
    }

    #[test]
    fn seeded_solves_agree() {
        let p = program(
            &[["s1", "1", "1"], ["s2", "2", "2"], ["s3", "1", "2"], ["s4", "2", "1"]],
            &[2, 2],
        );
        let params = SolverParams {
            seed: 42,
            ..SolverParams::default()
        };
        let first = CbcBackend.solve(&p, &params).unwrap();
        let second = CbcBackend.solve(&p, &params).unwrap();
        assert_eq!(p.objective_value(&first), p.objective_value(&second));
    }
}

//! The 0/1 assignment program as plain data, independent of any solver library.
//!
//! There is one binary variable `x[g][s]` per group `g` and subject `s`, stored at index
//! `g * num_subjects + s`. Each group gets a capacity constraint `sum_s x[g][s] <= capacity[g]`,
//! each subject a uniqueness constraint `sum_g x[g][s] = 1`, and the objective is to minimize
//! `sum cost[g][s] * x[g][s]`.

use crate::cost::CostMatrix;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessEq,
    Eq,
}

/// `sum(x[v] for v in variables) <sense> rhs`, all coefficients being 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub variables: Vec<usize>,
    pub sense: Sense,
    pub rhs: f64,
}

/// The `(group, subject)` index pairs whose variable is 1, sorted by group, then subject.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSolution(pub Vec<(usize, usize)>);

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentProgram {
    num_groups: usize,
    num_subjects: usize,
    /// Objective coefficient of every variable
    costs: Vec<f64>,
    capacities: Vec<u32>,
}

impl AssignmentProgram {
    pub fn new(matrix: &CostMatrix, capacities: &[u32]) -> Result<AssignmentProgram> {
        if capacities.len() != matrix.num_groups() {
            return Err(Error::Configuration(format!(
                "got {} capacities for {} groups",
                capacities.len(),
                matrix.num_groups()
            )));
        }
        let costs = (0..matrix.num_groups())
            .flat_map(|g| (0..matrix.num_subjects()).map(move |s| (g, s)))
            .map(|(g, s)| matrix.get(g, s))
            .collect();
        Ok(AssignmentProgram {
            num_groups: matrix.num_groups(),
            num_subjects: matrix.num_subjects(),
            costs,
            capacities: capacities.to_vec(),
        })
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    pub fn num_subjects(&self) -> usize {
        self.num_subjects
    }

    pub fn num_variables(&self) -> usize {
        self.costs.len()
    }

    pub fn variable(&self, g: usize, s: usize) -> usize {
        g * self.num_subjects + s
    }

    /// Inverse of `variable()`.
    pub fn pair(&self, v: usize) -> (usize, usize) {
        (v / self.num_subjects, v % self.num_subjects)
    }

    pub fn objective(&self) -> &[f64] {
        &self.costs
    }

    pub fn capacities(&self) -> &[u32] {
        &self.capacities
    }

    pub fn capacity_constraints(&self) -> impl Iterator<Item = LinearConstraint> + '_ {
        (0..self.num_groups).map(move |g| LinearConstraint {
            variables: (0..self.num_subjects).map(|s| self.variable(g, s)).collect(),
            sense: Sense::LessEq,
            rhs: self.capacities[g] as f64,
        })
    }

    pub fn uniqueness_constraints(&self) -> impl Iterator<Item = LinearConstraint> + '_ {
        (0..self.num_subjects).map(move |s| LinearConstraint {
            variables: (0..self.num_groups).map(|g| self.variable(g, s)).collect(),
            sense: Sense::Eq,
            rhs: 1.0,
        })
    }

    pub fn constraints(&self) -> impl Iterator<Item = LinearConstraint> + '_ {
        self.capacity_constraints().chain(self.uniqueness_constraints())
    }

    /// Reject programs that cannot have a solution because the groups do not have enough places
    /// in total.
    pub fn check_capacity(&self) -> Result<()> {
        let places: u64 = self.capacities.iter().map(|c| *c as u64).sum();
        if places < self.num_subjects as u64 {
            return Err(Error::InfeasibleAssignment(format!(
                "{} subjects but only {} places in all groups",
                self.num_subjects, places
            )));
        }
        Ok(())
    }

    /// Total cost of a solution.
    pub fn objective_value(&self, solution: &RawSolution) -> f64 {
        solution
            .0
            .iter()
            .map(|(g, s)| self.costs[self.variable(*g, *s)])
            .sum()
    }

    /// Check that a solution assigns every subject exactly once and respects all capacities.
    pub fn verify(&self, solution: &RawSolution) -> Result<()> {
        let mut per_subject = vec![0usize; self.num_subjects];
        let mut per_group = vec![0u32; self.num_groups];
        for (g, s) in solution.0.iter() {
            if *g >= self.num_groups || *s >= self.num_subjects {
                return Err(Error::InfeasibleAssignment(format!(
                    "solver returned unknown pair ({}, {})",
                    g, s
                )));
            }
            per_subject[*s] += 1;
            per_group[*g] += 1;
        }
        if let Some(s) = per_subject.iter().position(|n| *n != 1) {
            return Err(Error::InfeasibleAssignment(format!(
                "subject #{} was assigned {} times",
                s + 1,
                per_subject[s]
            )));
        }
        if let Some(g) = (0..self.num_groups).find(|g| per_group[*g] > self.capacities[*g]) {
            return Err(Error::InfeasibleAssignment(format!(
                "group #{} got {} subjects for {} places",
                g + 1,
                per_group[g],
                self.capacities[g]
            )));
        }
        Ok(())
    }
}

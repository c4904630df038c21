use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// How the base capacity of each group is given.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapClasses {
    /// Split the subjects evenly over all groups.
    #[default]
    Equal,
    /// The same base capacity for every group.
    Uniform(u32),
    /// One base capacity per group, in table column order.
    PerGroup(Vec<u32>),
}

/// Compute the capacity of every group: the base capacity scaled up by `excess_space` percent and
/// rounded up.
pub fn plan_capacities(
    num_subjects: usize,
    num_groups: usize,
    cap_classes: &CapClasses,
    excess_space: f64,
) -> Result<Vec<u32>> {
    if !excess_space.is_finite() || excess_space < 0.0 {
        return Err(Error::Configuration(format!(
            "excess space must be a non-negative percentage, got {}",
            excess_space
        )));
    }
    if num_groups == 0 {
        return Err(Error::Configuration("there are no groups to fill".to_string()));
    }

    let base = match cap_classes {
        CapClasses::Equal => vec![num_subjects.div_ceil(num_groups) as u32; num_groups],
        CapClasses::Uniform(c) => vec![*c; num_groups],
        CapClasses::PerGroup(caps) if caps.len() == num_groups => caps.clone(),
        CapClasses::PerGroup(caps) => {
            return Err(Error::Configuration(format!(
                "got {} class capacities for {} groups",
                caps.len(),
                num_groups
            )));
        }
    };
    if !matches!(cap_classes, CapClasses::Equal) && base.contains(&0) {
        return Err(Error::Configuration(
            "class capacities must be positive".to_string(),
        ));
    }

    let capacities: Vec<u32> = base.iter().map(|b| scale(*b, excess_space)).collect();
    debug!(
        "Planned capacities {:?} from base {:?} with {}% excess space",
        capacities, base, excess_space
    );
    Ok(capacities)
}

/// `ceil(base * (1 + excess / 100))`. Multiplying before dividing keeps whole results exact, so
/// e.g. 5 places with 20% excess give 6 and not 7.
fn scale(base: u32, excess_space: f64) -> u32 {
    (base as f64 * (100.0 + excess_space) / 100.0).ceil() as u32
}

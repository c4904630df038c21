use std::fs::read_to_string;

use log::info;
use priogroup::{Options, Problem, io, report};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let table_path = args
        .next()
        .ok_or("Usage: <program> <input_table> [options.yaml] [pre_grouping]")?;

    let mut problem = Problem::new(io::read_table(&table_path)?);
    if let Some(path) = args.next() {
        problem.options = serde_yaml::from_str::<Options>(&read_to_string(path)?)?;
    }
    if let Some(path) = args.next() {
        problem.pre_grouping = io::read_pre_grouping(path)?;
    }
    info!(
        "Read {} subjects and {} groups from {}",
        problem.table.num_subjects(),
        problem.table.num_groups(),
        table_path
    );

    let result = problem.solve()?;
    eprint!("{}", report::format_summary(&result));
    io::write_export(std::io::stdout().lock(), &result)?;
    Ok(())
}

//! Check command implementation

use crate::cli::output::{format_snapshots_json, format_snapshots_table};
use crate::cli::serve::load_config;
use crate::cli::CheckArgs;
use crate::scheduler::{CycleScheduler, StatusSnapshot};

/// Handle `vigil check`: run one cycle and render the snapshots.
///
/// Rows are sorted by endpoint name so repeated runs line up.
pub async fn handle_check(args: &CheckArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    config.validate()?;

    let scheduler = CycleScheduler::from_config(&config)?;
    let mut snapshots: Vec<StatusSnapshot> = scheduler.run_cycle().await;
    snapshots.sort_by(|a, b| a.name.cmp(&b.name));

    if args.json {
        Ok(format_snapshots_json(&snapshots)?)
    } else {
        Ok(format_snapshots_table(&snapshots))
    }
}

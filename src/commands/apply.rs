use anyhow::{Result, bail};

use crate::config::RunConfig;
use crate::engine;

pub fn run(config: &RunConfig) -> Result<()> {
    config.dump();

    let desired = super::load_definition(config)?;
    let client = super::connect(config)?;
    let plan = engine::build_plan(&desired, &client, config.jobs, config.quiet)?;

    let Some(report) = engine::apply(&plan, &client, config)? else {
        return Ok(());
    };

    let failures = report.failures();
    if !failures.is_empty() {
        bail!(
            "{} of {} permission changes failed",
            failures.len(),
            plan.total_changes()
        );
    }
    Ok(())
}

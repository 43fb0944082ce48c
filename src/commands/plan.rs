use anyhow::Result;
use reconcile::ReconciliationPlan;

use crate::config::RunConfig;
use crate::engine;

pub fn run(config: &RunConfig, json: bool) -> Result<()> {
    config.dump();

    let desired = super::load_definition(config)?;
    let client = super::connect(config)?;
    let plan = engine::build_plan(&desired, &client, config.jobs, config.quiet || json)?;

    show(&plan, json)
}

/// Print the plan once, either boxed or as JSON
///
/// Takes no client: printing a plan never reaches the executor.
fn show(plan: &ReconciliationPlan, json: bool) -> Result<()> {
    if json {
        println!("{}", engine::plan_json(plan)?);
    } else {
        engine::display_plan(plan);
    }
    Ok(())
}

use anyhow::Result;

use crate::config::RunConfig;
use crate::ui;

pub fn run(config: &RunConfig) -> Result<()> {
    config.dump();

    let desired = super::load_definition(config)?;

    if !config.quiet {
        ui::header("Permission File");
        ui::kv("Path", &config.permission_file.display().to_string());
        ui::kv("Version", &desired.version().to_string());
        ui::kv("Files", &desired.resources().len().to_string());
        ui::kv("Permissions", &desired.entry_count().to_string());
        println!();
    }
    ui::success(&format!("{} is valid", config.permission_file.display()));
    Ok(())
}

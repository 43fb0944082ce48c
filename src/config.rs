//! Run configuration, resolved once from the command line

use crate::cli::{ApplyArgs, Cli, PlanArgs};
use reconcile::ExecuteOptions;
use std::path::PathBuf;

/// Everything a command needs to know about how it was invoked
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Service-account key file
    pub credential_file: PathBuf,
    /// Declaration of the desired permissions
    pub permission_file: PathBuf,
    /// Dump options and the loaded definition
    pub debug: bool,
    pub quiet: bool,
    /// Concurrent Drive requests per batch
    pub jobs: usize,
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
}

impl RunConfig {
    /// Options shared by every command
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            credential_file: cli.credential_file.clone(),
            permission_file: cli.permission_file.clone(),
            debug: cli.debug,
            quiet: cli.quiet,
            jobs: ExecuteOptions::default().jobs,
            dry_run: false,
            yes: false,
        }
    }

    pub fn with_apply(mut self, args: &ApplyArgs) -> Self {
        self.jobs = usize::from(args.jobs);
        self.dry_run = args.dry_run;
        self.yes = args.yes;
        self
    }

    pub fn with_plan(mut self, args: &PlanArgs) -> Self {
        self.jobs = usize::from(args.jobs);
        self.dry_run = true;
        self
    }

    /// Options handed to the reconciliation executor
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            dry_run: self.dry_run,
            jobs: self.jobs,
        }
    }

    /// Print the resolved options when `--debug` is set
    pub fn dump(&self) {
        if self.debug {
            eprintln!("opts= {self:#?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from(["permsync", "apply", "-j", "2", "--dry-run"]).unwrap();
        let args = match &cli.command {
            Some(crate::cli::Command::Apply(args)) => args.clone(),
            _ => panic!("expected apply"),
        };

        let config = RunConfig::from_cli(&cli).with_apply(&args);
        assert_eq!(config.jobs, 2);
        assert!(config.dry_run);
        assert!(!config.yes);

        let opts = config.execute_options();
        assert_eq!(opts.jobs, 2);
        assert!(opts.dry_run);
    }

    #[test]
    fn test_plan_is_always_dry_run() {
        let cli = Cli::try_parse_from(["permsync", "plan"]).unwrap();
        let config = RunConfig::from_cli(&cli).with_plan(&PlanArgs {
            jobs: 3,
            json: false,
        });
        assert!(config.dry_run);
        assert_eq!(config.jobs, 3);
    }

    #[test]
    fn test_default_jobs() {
        let cli = Cli::try_parse_from(["permsync"]).unwrap();
        let config = RunConfig::from_cli(&cli).with_apply(&ApplyArgs::default());
        assert_eq!(config.jobs, 4);
        assert!(!config.dry_run);
    }
}

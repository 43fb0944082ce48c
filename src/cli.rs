use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "permsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative Google Drive permissions", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output extra debugging (parsed options and loaded definition)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to the Google API credential file
    #[arg(
        short,
        long,
        global = true,
        env = "PERMSYNC_CREDENTIAL_FILE",
        default_value = "./credentials.json"
    )]
    pub credential_file: PathBuf,

    /// Path to the permission file
    #[arg(
        short = 'f',
        long,
        global = true,
        env = "PERMSYNC_PERMISSION_FILE",
        default_value = "./permissions.yml"
    )]
    pub permission_file: PathBuf,

    /// Defaults to `apply` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Make the sharing settings match the permission file
    Apply(ApplyArgs),

    /// Show what apply would change
    Plan(PlanArgs),

    /// Check the permission file without contacting Drive
    Validate,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Number of concurrent Drive requests
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the actions without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for ApplyArgs {
    fn default() -> Self {
        Self {
            jobs: 4,
            yes: false,
            dry_run: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Number of concurrent Drive requests
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let cli = Cli::try_parse_from(["permsync"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
        assert_eq!(cli.credential_file, PathBuf::from("./credentials.json"));
        assert_eq!(cli.permission_file, PathBuf::from("./permissions.yml"));
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "permsync",
            "-d",
            "-c",
            "key.json",
            "-f",
            "team.yml",
            "apply",
            "-j",
            "8",
            "-y",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.credential_file, PathBuf::from("key.json"));
        assert_eq!(cli.permission_file, PathBuf::from("team.yml"));
        match cli.command {
            Some(Command::Apply(args)) => {
                assert_eq!(args.jobs, 8);
                assert!(args.yes);
                assert!(!args.dry_run);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["permsync", "plan", "--json", "-f", "x.yml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.permission_file, PathBuf::from("x.yml"));
        assert!(matches!(cli.command, Some(Command::Plan(PlanArgs { json: true, .. }))));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["permsync", "apply", "--jobs", "0"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

//! CLI tools for shipline
//!
//! - `run`: Execute the release pipeline for a trigger
//! - `plan`: Show the expanded plan without executing anything
//! - `completions`: Generate shell completions

pub mod completions;
pub mod plan;
pub mod run;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::pipeline::trigger::EventKind;

/// CLI arguments for shipline
#[derive(Parser, Debug)]
#[command(name = "shipline")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Trigger description shared by `run` and `plan`
#[derive(ClapArgs, Debug, Clone)]
pub struct TriggerArgs {
    /// Kind of triggering event
    #[arg(long, value_enum)]
    pub event: EventArg,

    /// Branch or ref name, e.g. `master` or `refs/heads/feature/x`
    #[arg(long = "ref")]
    pub ref_name: String,

    /// Full commit hash under build
    #[arg(long)]
    pub commit: String,

    /// Explicit version tag; omit for tagless runs
    #[arg(long)]
    pub tag: Option<String>,
}

/// Pipeline tuning shared by `run` and `plan`
#[derive(ClapArgs, Debug, Clone)]
pub struct PipelineArgs {
    /// Image repository the publishing jobs push to
    #[arg(long)]
    pub image: Option<String>,

    /// Protected integration branch
    #[arg(long)]
    pub protected_branch: Option<String>,

    /// Maximum concurrently running job instances
    #[arg(long)]
    pub jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute the release pipeline for a trigger
    Run {
        #[command(flatten)]
        trigger: TriggerArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the expanded plan without executing anything
    Plan {
        #[command(flatten)]
        trigger: TriggerArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Triggering event kind as a CLI value
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EventArg {
    /// Code submitted for review
    PullRequest,
    /// Manual invocation
    Dispatch,
}

impl From<EventArg> for EventKind {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::PullRequest => Self::PullRequest,
            EventArg::Dispatch => Self::ManualDispatch,
        }
    }
}

/// Supported completion shells
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
#[allow(missing_docs)]
pub enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    use clap::CommandFactory;
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<std::process::ExitCode> {
    let args = Args::parse();

    match args.command {
        Command::Run {
            trigger,
            pipeline,
            json,
        } => run::run_pipeline(&trigger, &pipeline, json),
        Command::Plan { trigger, pipeline } => {
            plan::print_plan(&trigger, &pipeline)?;
            Ok(std::process::ExitCode::SUCCESS)
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell_enum)?;
            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                println!("{}", completions);
            }
            Ok(std::process::ExitCode::SUCCESS)
        }
    }
}

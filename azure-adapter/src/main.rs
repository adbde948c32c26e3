//! `claude-azure-task`: the pipeline entry point.

use azure_adapter::comments::post_pr_review_comments;
use azure_adapter::vso::{self, TaskResult};
use azure_adapter::{report, report_error, run_task, validate, ProcessEnvironment};
use clap::{Parser, Subcommand};
use pr_review::HttpTransport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs Claude Code with the task's inputs (default)
    Run,
    /// Validates the task inputs (or, without inputs, the environment) and exits
    Validate,
    /// Posts review comments from an existing execution log
    PostComments {
        /// Execution log written by a previous run
        #[arg(long)]
        execution_file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let env = ProcessEnvironment;
    let code = match cli.command {
        Some(Commands::Validate) => match validate(&env) {
            Ok(()) => {
                vso::set_result(TaskResult::Succeeded, "Configuration is valid");
                0
            }
            Err(e) => report_error(&e),
        },
        Some(Commands::PostComments { execution_file }) => {
            post_pr_review_comments(&env, &execution_file, &HttpTransport::default()).await;
            0
        }
        Some(Commands::Run) | None => match run_task(&env).await {
            Ok(result) => report(&result),
            Err(e) => report_error(&e),
        },
    };

    std::process::exit(code);
}

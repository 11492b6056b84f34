mod commands;
mod helpers;

use cascade_core::CascadeError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

pub fn run_from_env() -> i32 {
    init_tracing();

    match run(std::env::args().skip(1)) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_cascade_error();
            tracing::debug!(code = diagnostic.code(), "command failed");
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.fatal_exit_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("cascade-eval".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn init_tracing() {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_LOG_FILTER),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "cascade-eval",
    version,
    about = "Evaluate the reduced-state property cascade against a reference table"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate one (x, y, z) request; prompts on stdin when coordinates are omitted
    #[command(allow_negative_numbers = true)]
    Eval(commands::EvalArgs),
    /// Evaluate every `x y z` line of a request file
    Batch(commands::BatchArgs),
    /// Print the reference table file selected for an x coordinate
    #[command(allow_negative_numbers = true)]
    Select(commands::SelectArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Eval(args) => commands::run_eval_command(args),
        CliCommand::Batch(args) => commands::run_batch_command(args),
        CliCommand::Select(args) => commands::run_select_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(CascadeError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_cascade_error(&self) -> CascadeError {
        match self {
            Self::Usage(message) => {
                CascadeError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => CascadeError::internal("SYS.CLI", format!("{error:#}")),
        }
    }
}

impl From<CascadeError> for CliError {
    fn from(error: CascadeError) -> Self {
        Self::Compute(error)
    }
}

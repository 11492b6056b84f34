use super::CliError;
use super::helpers::*;
use anyhow::Context;
use cascade_core::table::load_table;
use cascade_core::{EvaluationRequest, TableKind, evaluate_traced};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct EvalArgs {
    /// x coordinate (prompted for when all three are omitted)
    #[arg(value_name = "X")]
    x: Option<f64>,

    /// y coordinate
    #[arg(value_name = "Y")]
    y: Option<f64>,

    /// z coordinate
    #[arg(value_name = "Z")]
    z: Option<f64>,

    #[command(flatten)]
    tables: TableSourceArgs,

    /// Use this table file instead of selecting one from x
    #[arg(long, value_name = "FILE")]
    table: Option<PathBuf>,

    /// Print the result as a JSON object
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct BatchArgs {
    /// Request file with one `x y z` triple per line
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    #[command(flatten)]
    tables: TableSourceArgs,

    /// Print the results as a JSON array
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct SelectArgs {
    /// x coordinate used to pick the table
    #[arg(value_name = "X")]
    x: f64,
}

#[derive(clap::Args)]
pub(super) struct TableSourceArgs {
    /// Directory holding the high/unit/low reference tables
    #[arg(long, value_name = "DIR", default_value = ".")]
    table_dir: PathBuf,
}

impl EvalArgs {
    fn request(&self) -> Result<Option<EvaluationRequest>, CliError> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Ok(Some(EvaluationRequest::new(x, y, z))),
            (None, None, None) => Ok(None),
            _ => Err(CliError::Usage(
                "expected all three coordinates X Y Z, or none to be prompted".to_string(),
            )),
        }
    }
}

pub(super) fn run_eval_command(args: EvalArgs) -> Result<i32, CliError> {
    let request = match args.request()? {
        Some(request) => request,
        None => prompt_for_request()?,
    };

    let table_path = resolve_table_path(&args.tables.table_dir, args.table.as_deref(), request.x);
    tracing::info!(%request, table = %table_path.display(), "evaluating request");

    let table = load_table(&table_path)?;
    let evaluation =
        evaluate_traced(&table, request).map_err(|error| CliError::Compute(error.into()))?;
    let report = EvaluationReport::new(request, &table_path, evaluation);

    if args.json {
        let rendered = serde_json::to_string_pretty(&report);
        println!("{}", rendered.context("failed to serialize report")?);
    } else {
        println!("{}", report.render_line());
    }
    Ok(0)
}

pub(super) fn run_batch_command(args: BatchArgs) -> Result<i32, CliError> {
    let requests = read_batch_requests(&args.input)?;
    let mut cache = TableCache::default();
    let mut reports = Vec::with_capacity(requests.len());

    for request in requests {
        let table_path = resolve_table_path(&args.tables.table_dir, None, request.x);
        let table = cache.get_or_load(&table_path)?;
        let evaluation =
            evaluate_traced(table, request).map_err(|error| CliError::Compute(error.into()))?;
        reports.push(EvaluationReport::new(request, &table_path, evaluation));
    }
    tracing::info!(
        requests = reports.len(),
        tables = cache.len(),
        "batch evaluation finished"
    );

    if args.json {
        let rendered = serde_json::to_string_pretty(&reports);
        println!("{}", rendered.context("failed to serialize reports")?);
    } else {
        for report in &reports {
            println!("{}", report.render_line());
        }
    }
    Ok(0)
}

pub(super) fn run_select_command(args: SelectArgs) -> Result<i32, CliError> {
    let kind = TableKind::for_coordinate(args.x);
    println!("{} {}", kind, kind.file_name());
    Ok(0)
}

fn prompt_for_request() -> Result<EvaluationRequest, CliError> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", PROMPT).context("failed to write prompt")?;
    stdout.flush().context("failed to flush prompt")?;

    let stdin = io::stdin();
    let request = read_coordinates(&mut stdin.lock())?;
    Ok(request)
}

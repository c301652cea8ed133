mod batch;
mod cli;
mod error;
mod interrupt;
mod recorder;

use crate::batch::{Batch, Dimensions, Folder, Interactive, Kind, Limits};
use crate::cli::Args;
use crate::error::{ErrorKind, Result};
use clap::{CommandFactory, Parser};
use exn::ResultExt;
use scan_batcher_config::Defaults;
use scan_batcher_template::Context;
use scan_batcher_workflow::{EngineOptions, Registry, Workflow};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use time::UtcOffset;

fn main() -> ExitCode {
    // Only sound while the process is single-threaded.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let args = Args::parse();

    let kind = match Kind::parse(&args.batch) {
        Ok(kind) => kind,
        Err(err) => Args::command().error(clap::error::ErrorKind::InvalidValue, err).exit(),
    };
    if kind.runs_workflow() && args.workflow.is_none() {
        Args::command()
            .error(clap::error::ErrorKind::MissingRequiredArgument, "a workflow directory (--workflow) is required")
            .exit();
    }
    let defaults = match Defaults::load(args.config.as_deref()) {
        Ok(defaults) => defaults,
        Err(err) => return report(&err),
    };
    let log_file = args.log_file.clone().unwrap_or_else(|| defaults.log_file.clone());
    if let Err(err) = recorder::init(&log_file, args.terminal_level(), local_offset) {
        return report(&err);
    }
    tracing::info!("Script has been started");

    let code = match run(&args, &defaults, kind, local_offset) {
        Ok(()) => {
            tracing::info!("Script has been completed");
            ExitCode::SUCCESS
        },
        Err(err) => report(&err),
    };
    recorder::finish();
    code
}

fn report<E: std::fmt::Display + std::fmt::Debug>(err: &E) -> ExitCode {
    eprintln!("Error: {err}");
    tracing::error!(error = ?err, "Fatal error");
    ExitCode::FAILURE
}

fn run(args: &Args, defaults: &Defaults, kind: Kind, local_offset: UtcOffset) -> Result<()> {
    interrupt::install()?;
    let dimensions = Dimensions {
        photo_width: args.photo_width,
        photo_height: args.photo_height,
        image_width: args.image_width,
        image_height: args.image_height,
    };
    let limits = Limits {
        min_dpi: args.min_dpi.or(defaults.min_dpi),
        max_dpi: args.max_dpi.or(defaults.max_dpi),
        dpis: if args.dpis.is_empty() { defaults.dpis.clone() } else { args.dpis.clone() },
        rounding: args.rounding.unwrap_or(defaults.rounding),
    };
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout();
    let mut batch: Box<dyn Batch> = match &kind {
        Kind::Calculate => Box::new(Interactive::calculate(stdin, stdout, dimensions, limits)?),
        Kind::Scan => Box::new(Interactive::scan(stdin, stdout, dimensions, limits)?),
        Kind::Process { folder, pattern } => Box::new(Folder::new(folder, pattern)?),
    };
    let Some(workflow_path) = args.workflow.as_deref().filter(|_| kind.runs_workflow()) else {
        return drain(batch.as_mut());
    };

    let engine = args.engine.as_deref().unwrap_or(&defaults.engine);
    let settings = args
        .settings
        .clone()
        .or_else(|| defaults.settings_path(engine))
        .unwrap_or_else(|| PathBuf::from(format!("{engine}.ini")));
    let options = EngineOptions { settings, local_offset };
    let workflow = Registry::builtin().create(engine, &options).or_raise(|| ErrorKind::Workflow)?;
    tracing::info!(engine = workflow.name(), settings = %options.settings.display(), "Workflow engine ready");

    let templates: Context = args.templates.iter().cloned().collect();
    loop {
        let item = match batch.next_item() {
            Ok(Some(item)) => item,
            Ok(None) => break,
            Err(err) => {
                report_item(&err);
                continue;
            },
        };
        let mut context = templates.clone();
        context.extend(item.iter().map(|(key, value)| (key, value.clone())));
        process(workflow.as_ref(), &mut context, workflow_path);
        if interrupt::requested() {
            tracing::info!("Exiting...");
            break;
        }
    }
    Ok(())
}

/// Runs a batch that feeds no workflow, reporting per-item errors.
fn drain(batch: &mut dyn Batch) -> Result<()> {
    loop {
        match batch.next_item() {
            Ok(Some(_)) => {},
            Ok(None) => return Ok(()),
            Err(err) => report_item(&err),
        }
    }
}

fn process(workflow: &dyn Workflow, context: &mut Context, workflow_path: &Path) {
    let _section = interrupt::CriticalSection::enter();
    if let Err(err) = workflow.run(context, workflow_path) {
        report_item(&err);
    }
}

fn report_item<E: std::fmt::Display + std::fmt::Debug>(err: &E) {
    eprintln!("\nError: {err}");
    tracing::error!(error = ?err, "Batch item failed");
}

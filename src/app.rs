//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the model index
//! - runs the forecast pipeline
//! - prints tables/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, warn};

use crate::cli::{Command, DemoArgs, ForecastArgs, ModelsArgs, WeeklyArgs};
use crate::domain::ValueKind;
use crate::error::AppError;
use crate::report::format::{TableView, format_for_display, format_for_download};

pub mod pipeline;

/// Environment variable naming the model directory.
pub const MODELS_DIR_ENV: &str = "FCAST_MODELS_DIR";

const DEFAULT_MODELS_DIR: &str = "models";

/// Entry point for the `fcast` binary.
pub fn run() -> Result<(), AppError> {
    crate::logging::init();
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("ignoring unreadable .env: {e}");
        }
    }

    // We want `fcast` and `fcast -c Fiction` to behave like `fcast forecast ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::List(args) => handle_list(args),
        Command::Weekly(args) => handle_weekly(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let index = crate::io::index::build_index(&resolve_models_dir(&args.models))?;
    let (category, target) =
        crate::cli::picker::resolve_selection(&index, args.category.clone(), args.target.clone())?;
    let request = request_from_args(&args, category, target);
    let run = pipeline::run_forecast(&index, &request)?;

    println!("{}", crate::report::format_run_summary(&run));

    let kind = run.meta.value_kind();
    print_table("Daily forecast", &run.daily_view(), kind, args.rows);
    let show_plot = args.plot && !args.no_plot;
    if show_plot {
        println!(
            "{}",
            crate::plot::render_forecast_plot(&run.daily, run.show_intervals, args.width, args.height)
        );
    }

    if let (Some(weekly), Some(view)) = (&run.weekly, run.weekly_view()) {
        print_table(&format!("Weekly forecast ({})", weekly.rule), &view, kind, args.rows);
        if show_plot {
            println!("{}", crate::plot::render_weekly_plot(weekly, args.width, args.height));
        }
    }

    if let Some(dir) = &args.export_dir {
        for download in run.downloads()? {
            let path = crate::io::export::write_download(dir, &download)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn handle_list(args: ModelsArgs) -> Result<(), AppError> {
    let index = crate::io::index::build_index(&resolve_models_dir(&args))?;
    print!("{}", crate::report::format_index_listing(&index));
    Ok(())
}

fn handle_weekly(args: WeeklyArgs) -> Result<(), AppError> {
    let input = crate::io::ingest::read_daily_csv(&args.input, &args.date_column, &args.column)?;
    for err in &input.row_errors {
        warn!(line = err.line, "skipped row: {}", err.message);
    }
    debug!(rows = input.rows_read, numeric = input.numeric_rows(), "daily input loaded");

    let weekly = crate::forecast::weekly_from_daily(input.points.iter().copied(), args.week_rule);
    let view = TableView::weekly(&weekly);
    let kind = ValueKind::for_target(&args.target);

    print_table(&format!("Weekly forecast ({})", weekly.rule), &view, kind, args.rows);

    if let Some(path) = &args.output {
        let bytes = format_for_download(&view, kind).to_csv()?;
        std::fs::write(path, &bytes)
            .map_err(|e| AppError::io(format!("Failed to write weekly CSV '{}': {e}", path.display())))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = crate::data::DemoConfig::with_seed(args.seed);
    let paths = crate::data::write_demo_bundles(&args.out, &config)?;
    for path in &paths {
        println!("Wrote {}", path.display());
    }
    println!(
        "{} bundle(s). Try: fcast forecast --models-dir {}",
        paths.len(),
        args.out.display()
    );
    Ok(())
}

fn print_table(title: &str, view: &TableView, kind: ValueKind, rows: usize) {
    let shown = view.tail(rows);
    println!("{title}: showing last {} of {} row(s)", shown.len(), view.len());
    println!("{}", crate::report::format_text_table(&format_for_display(&shown, kind)));
}

/// `--models-dir`, else `FCAST_MODELS_DIR`, else `models`.
pub fn resolve_models_dir(args: &ModelsArgs) -> PathBuf {
    args.models_dir
        .clone()
        .or_else(|| std::env::var_os(MODELS_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR))
}

pub fn request_from_args(args: &ForecastArgs, category: String, target: String) -> pipeline::ForecastRequest {
    pipeline::ForecastRequest {
        category,
        target,
        horizon_years: args.years,
        include_history: !args.no_history,
        show_intervals: !args.no_intervals,
        show_weekly: !args.no_weekly,
    }
}

/// Rewrite argv so `fcast` defaults to `fcast forecast`.
///
/// Rules:
/// - `fcast`                      -> `fcast forecast`
/// - `fcast -c Fiction ...`       -> `fcast forecast -c Fiction ...`
/// - `fcast --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("forecast".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "forecast" | "list" | "weekly" | "demo");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "forecast flags".
    if arg1.starts_with('-') {
        argv.insert(1, "forecast".to_string());
        return argv;
    }

    argv
}

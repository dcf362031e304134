use std::path::PathBuf;

use chrono::Timelike;
use tradechains::datasource::{store_csv, store_json, CsvTransactionSource};
use tradechains::{annotate, Config, OutputFormat, TransactionSource};

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (PathBuf::from(input), PathBuf::from(output)),
        _ => {
            eprintln!("Usage: tradechains <input.csv> <output.{{csv|json}}>");
            std::process::exit(2);
        }
    };

    let source = CsvTransactionSource::new(&input);
    let transactions = match source.load() {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Failed to load {}: {}", input.display(), e);
            std::process::exit(1);
        }
    };
    tracing::info!(rows = transactions.len(), input = %input.display(), "loaded transactions");

    // Whole-second mark timestamps; sub-second noise just churns the output.
    let startup = chrono::Local::now()
        .naive_local()
        .with_nanosecond(0)
        .expect("zero nanoseconds is valid");
    let match_config = config.match_config(startup);
    let annotated = match annotate(transactions, &match_config) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Annotation failed: {}", e);
            std::process::exit(1);
        }
    };

    let stored = match config.output_format {
        OutputFormat::Csv => store_csv(&output, &annotated),
        OutputFormat::Json => store_json(&output, &annotated),
    };
    if let Err(e) = stored {
        eprintln!("Failed to write {}: {}", output.display(), e);
        std::process::exit(1);
    }

    tracing::info!(rows = annotated.len(), output = %output.display(), "wrote annotated table");
}

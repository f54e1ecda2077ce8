//! # Query Sheriff
//!
//! Inspects SQL queries captured from an application's database layer,
//! detects inefficiency patterns, and emits structured optimization
//! reports. Built for backend engineers validating ORM-generated queries
//! before production deployment.
//!
//! # Architecture
//!
//! One invocation inspects one closed batch of captured query records:
//!
//! 1. **Capture** - records arrive from a log file (`SQL: <query>` lines),
//!    a JSON-lines middleware dump, or inline SQL arguments.
//! 2. **Normalize** - each capture becomes an immutable record with a
//!    classified statement kind and a parameter-stripped signature;
//!    malformed captures are dropped and counted.
//! 3. **Detect** - a static set of detectors fans out over the batch in
//!    parallel, each applying one heuristic.
//! 4. **Aggregate & report** - findings are grouped by pattern and
//!    signature, counted, paired with optimization tips, and rendered.
//!
//! # Quick Start
//!
//! ```bash
//! # Inspect queries from an application log
//! query-sheriff inspect --log app.log
//!
//! # Inspect a middleware capture dump, one JSON object per line
//! query-sheriff inspect --captures requests.jsonl
//!
//! # Pipe captures from another tool
//! cat requests.jsonl | query-sheriff inspect --captures -
//!
//! # Inspect statements inline
//! query-sheriff inspect "SELECT * FROM t OFFSET 5000" -f json
//! ```
//!
//! # Detected Patterns
//!
//! | Pattern | Severity | Description |
//! |---------|----------|-------------|
//! | N_PLUS_ONE | WARN | Same single-key lookup repeated per parent row |
//! | CARTESIAN_PRODUCT | ERROR | JOIN without ON/USING constraint |
//! | LARGE_OFFSET | WARN | OFFSET beyond the configured threshold |
//! | MISSING_INDEX | INFO | Repeated filtered scan on an unindexed-looking table |
//! | LOCK_TIMEOUT | WARN | Locking statement held past the lock threshold |
//! | LONG_TRANSACTION | WARN | BEGIN..COMMIT span past the transaction threshold |
//! | SMALL_TABLE_REDUNDANT | INFO | Repeated query against a known-small table |
//! | SLOW_QUERY | WARN | Duration past the slow-query threshold |
//!
//! # Exit Codes
//!
//! The process exit code reflects the highest severity finding:
//!
//! - `0` - no findings or informational hints only
//! - `1` - warnings found
//! - `2` - errors found
//!
//! # Configuration
//!
//! Thresholds load from `~/.config/query-sheriff/config.toml`, then
//! `.query-sheriff.toml`, then `QUERY_SHERIFF_*` environment variables,
//! then command-line flags. See the `config` module for the file format.

use std::process;

use clap::Parser;
use query_sheriff::{
    app::{InspectParams, run_inspect},
    cli::{Cli, Commands},
    config::Config
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(2);
        }
    };

    match cli.command {
        Commands::Inspect {
            log,
            captures,
            sql,
            slow_query_threshold,
            offset_threshold,
            lock_threshold,
            transaction_threshold,
            small_table_threshold,
            output_format,
            verbose,
            no_color
        } => {
            let params = InspectParams {
                log_path: log.map(|p| p.display().to_string()),
                captures_path: captures.map(|p| p.display().to_string()),
                sql,
                slow_query_threshold,
                offset_threshold,
                lock_threshold,
                transaction_threshold,
                small_table_threshold,
                output_format,
                verbose,
                no_color
            };
            match run_inspect(params, config) {
                Ok(result) => {
                    print!("{}", result.output);
                    process::exit(result.exit_code);
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    process::exit(2);
                }
            }
        }
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Query Sheriff - Inspect captured SQL queries for inefficiency patterns
#[derive(Parser, Debug)]
#[command(name = "query-sheriff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect a batch of captured queries
    Inspect {
        /// Log file containing `SQL: <query>` lines
        #[arg(short, long, conflicts_with = "captures")]
        log: Option<PathBuf>,

        /// JSON-lines capture file from request middleware (use - for stdin)
        #[arg(short, long)]
        captures: Option<PathBuf>,

        /// SQL statements supplied inline
        #[arg(value_name = "SQL")]
        sql: Vec<String>,

        /// Slow query threshold in seconds
        #[arg(long)]
        slow_query_threshold: Option<f64>,

        /// Largest acceptable OFFSET value
        #[arg(long)]
        offset_threshold: Option<u64>,

        /// Lock duration threshold in seconds
        #[arg(long)]
        lock_threshold: Option<f64>,

        /// Transaction duration threshold in seconds
        #[arg(long)]
        transaction_threshold: Option<f64>,

        /// Row count under which a table counts as small
        #[arg(long)]
        small_table_threshold: Option<u64>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Enable verbose output with signatures and timestamps
        #[arg(short, long)]
        verbose: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
    Yaml
}

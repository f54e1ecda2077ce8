//! Application logic for the Query Sheriff CLI.
//!
//! This module contains the application logic separated from the main entry
//! point to enable testing.

use std::io::{self, Read};

use crate::{
    capture::{from_json_file, from_log_file, from_sql_strings, parse_json_lines},
    cli::Format,
    config::Config,
    detectors::{InspectionReport, Inspector, Severity},
    error::{AppResult, file_read_error, invalid_config_error},
    output::{OutputFormat, OutputOptions, format_report},
    record::RawCapture
};

/// Parameters for the inspect command
#[derive(Debug, Clone, Default)]
pub struct InspectParams {
    pub log_path:              Option<String>,
    pub captures_path:         Option<String>,
    pub sql:                   Vec<String>,
    pub slow_query_threshold:  Option<f64>,
    pub offset_threshold:      Option<u64>,
    pub lock_threshold:        Option<f64>,
    pub transaction_threshold: Option<f64>,
    pub small_table_threshold: Option<u64>,
    pub output_format:         Format,
    pub verbose:               bool,
    pub no_color:              bool
}

/// Result of an inspection run
#[derive(Debug, Clone)]
pub struct InspectResult {
    pub exit_code: i32,
    pub output:    String,
    pub report:    InspectionReport
}

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Calculate exit code from the highest severity finding
pub fn calculate_exit_code(report: &InspectionReport) -> i32 {
    if report.entries.iter().any(|e| e.severity == Severity::Error) {
        2
    } else if report
        .entries
        .iter()
        .any(|e| e.severity == Severity::Warning)
    {
        1
    } else {
        0
    }
}

/// Create output options from parameters
pub fn create_output_options(format: Format, no_color: bool, verbose: bool) -> OutputOptions {
    OutputOptions {
        format: convert_format(format),
        colored: !no_color,
        verbose
    }
}

/// Apply CLI threshold overrides on top of loaded configuration
pub fn apply_threshold_overrides(config: &mut Config, params: &InspectParams) {
    if let Some(v) = params.slow_query_threshold {
        config.thresholds.slow_query_threshold = v;
    }
    if let Some(v) = params.offset_threshold {
        config.thresholds.offset_threshold = v;
    }
    if let Some(v) = params.lock_threshold {
        config.thresholds.lock_threshold = v;
    }
    if let Some(v) = params.transaction_threshold {
        config.thresholds.transaction_threshold = v;
    }
    if let Some(v) = params.small_table_threshold {
        config.thresholds.small_table_threshold = v;
    }
}

/// Read captures from whichever input source the parameters name.
///
/// One invocation is one batch scope; sources are never mixed.
pub fn read_captures(params: &InspectParams) -> AppResult<Vec<RawCapture>> {
    if let Some(path) = &params.log_path {
        return from_log_file(path);
    }
    if let Some(path) = &params.captures_path {
        if path == "-" {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| file_read_error("stdin", e))?;
            return Ok(parse_json_lines(&buffer));
        }
        return from_json_file(path);
    }
    if !params.sql.is_empty() {
        return Ok(from_sql_strings(&params.sql));
    }
    Err(invalid_config_error(
        "no input: provide --log, --captures, or inline SQL statements"
    ))
}

/// Run the inspect command
pub fn run_inspect(params: InspectParams, mut config: Config) -> AppResult<InspectResult> {
    apply_threshold_overrides(&mut config, &params);
    let captures = read_captures(&params)?;
    let inspector = Inspector::new();
    let report = inspector.analyze_captures(&captures, &config)?;
    let opts = create_output_options(params.output_format, params.no_color, params.verbose);
    let output = format_report(&report, &opts);
    let exit_code = calculate_exit_code(&report);
    Ok(InspectResult {
        exit_code,
        output,
        report
    })
}

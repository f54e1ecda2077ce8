use colored::Colorize;

use crate::detectors::{InspectionReport, ReportEntry, Severity};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    pub verbose: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            verbose: false
        }
    }
}

/// Format an inspection report based on output options
pub fn format_report(report: &InspectionReport, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(report).unwrap_or_default(),
        OutputFormat::Text => format_text_report(report, opts)
    }
}

fn severity_label(severity: Severity, colored: bool) -> String {
    let label = severity.to_string();
    if !colored {
        return label;
    }
    match severity {
        Severity::Error => label.red().bold().to_string(),
        Severity::Warning => label.yellow().bold().to_string(),
        Severity::Info => label.cyan().to_string()
    }
}

fn format_entry(entry: &ReportEntry, opts: &OutputOptions) -> String {
    let mut out = String::new();
    let occurrences = if entry.finding.occurrences == 1 {
        "1 occurrence".to_string()
    } else {
        format!("{} occurrences", entry.finding.occurrences)
    };
    let header = format!(
        "[{}] {} ({})",
        severity_label(entry.severity, opts.colored),
        entry.finding.pattern,
        occurrences
    );
    if opts.colored {
        out.push_str(&header.bold().to_string());
    } else {
        out.push_str(&header);
    }
    out.push('\n');
    out.push_str(&format!("Query: {}\n", entry.finding.sample_query));

    let sites: Vec<&str> = entry.finding.call_sites.iter().map(|s| s.as_str()).collect();
    out.push_str(&format!("Call sites: {}\n", sites.join(", ")));

    if opts.verbose {
        out.push_str(&format!("Signature: {}\n", entry.finding.signature));
        out.push_str(&format!(
            "First seen: {}\n",
            entry.finding.detected_at.to_rfc3339()
        ));
    }

    out.push_str("--- Optimization Tip ---\n");
    out.push_str(&entry.tip_text);
    out
}

fn format_text_report(report: &InspectionReport, opts: &OutputOptions) -> String {
    let mut out = String::new();
    let title = "=== Query Inspection Report ===\n\n";
    if opts.colored {
        out.push_str(&title.bold().to_string());
    } else {
        out.push_str(title);
    }

    if report.entries.is_empty() {
        out.push_str("No inefficiencies detected.\n");
    } else {
        for entry in &report.entries {
            out.push_str(&format_entry(entry, opts));
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "{} record(s) analyzed, {} dropped as malformed, {} detector(s) run\n",
        report.records_analyzed, report.records_dropped, report.detectors_run
    ));
    out.push_str(&format!(
        "Findings: {} error(s), {} warning(s), {} hint(s)\n",
        report.error_count(),
        report.warning_count(),
        report.info_count()
    ));
    out
}

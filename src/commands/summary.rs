//! Summary command implementation
//!
//! Fetches one snapshot and prints the dashboard headline numbers and backend
//! health, either as tables or as the same JSON the console API serves.

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use gateway_console::{
    config,
    stats::{build_summary, BackendHealth, MetricsSummary, SummaryOptions},
};
use std::path::Path;

use crate::cli::SourceArgs;

pub async fn execute(config_path: &Path, source: SourceArgs, threshold: Option<f64>) -> Result<()> {
    let options = summary_options(config_path, threshold)?;
    let text = super::load_exposition(config_path, &source).await?;
    let summary = build_summary(&text, &options);

    if source.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn summary_options(config_path: &Path, threshold: Option<f64>) -> Result<SummaryOptions> {
    let mut options = config::load_config(config_path)?.dashboard.summary_options();
    if let Some(threshold) = threshold {
        if !threshold.is_finite() || threshold <= 0.0 {
            anyhow::bail!("Invalid threshold: {}. Must be a positive number", threshold);
        }
        options.unhealthy_error_threshold = threshold;
    }
    Ok(options)
}

fn print_summary(summary: &MetricsSummary) {
    println!("{}", "Gateway Summary".green().bold());
    println!("{}", overview_table(summary));

    println!();
    println!("{}", "Backends".green().bold());
    if summary.backends.is_empty() {
        println!("{}", "No backends reported".dimmed());
    } else {
        println!("{}", backend_table(&summary.backends));
    }
}

fn overview_table(summary: &MetricsSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![header("METRIC"), header("VALUE")]);

    let rows = [
        ("Total requests", format_count(summary.total_requests)),
        ("Active connections", format_count(summary.active_connections)),
        ("Auth success rate", format!("{:.1}%", summary.auth_success_rate)),
        ("Cache hit rate", format!("{:.1}%", summary.cache_hit_rate)),
        ("2xx", format_count(summary.status_codes.success)),
        ("4xx", format_count(summary.status_codes.client_error)),
        ("5xx", format_count(summary.status_codes.server_error)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

fn backend_table(backends: &[BackendHealth]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![header("BACKEND"), header("STATUS"), header("ERRORS"), header("LATENCY")]);

    for backend in backends {
        let (status, color) = if backend.healthy {
            ("healthy", Color::Green)
        } else {
            ("unhealthy", Color::Red)
        };
        table.add_row(vec![
            Cell::new(&backend.url),
            Cell::new(status).fg(color),
            Cell::new(format_count(backend.error_count)),
            Cell::new(
                backend
                    .latency_ms
                    .map_or_else(|| "-".to_string(), |ms| format!("{:.1} ms", ms)),
            ),
        ]);
    }
    table
}

pub(crate) fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan)
}

/// Counters are whole numbers in practice; keep fractions visible when not
pub(crate) fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use gateway_console::stats::{aggregate_endpoints, EndpointStats};
use std::path::Path;

use super::summary::{format_count, header};
use crate::cli::SourceArgs;

/// Error rate (percent) above which a row is highlighted
const HIGHLIGHT_ERROR_RATE: f64 = 5.0;

/// Execute the endpoints command
pub async fn execute(config_path: &Path, source: SourceArgs) -> Result<()> {
    let text = super::load_exposition(config_path, &source).await?;
    let endpoints = aggregate_endpoints(&text);

    if source.json {
        println!("{}", serde_json::to_string_pretty(&endpoints)?);
    } else if endpoints.is_empty() {
        println!("{}", "No per-endpoint request counters found".yellow());
    } else {
        println!("{}", endpoint_table(&endpoints));
    }

    Ok(())
}

fn endpoint_table(endpoints: &[EndpointStats]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header("ENDPOINT"),
            header("REQUESTS"),
            header("2XX"),
            header("4XX"),
            header("5XX"),
            header("ERROR RATE"),
        ]);

    for stats in endpoints {
        let rate_color = if stats.error_rate > HIGHLIGHT_ERROR_RATE {
            Color::Red
        } else {
            Color::Green
        };
        table.add_row(vec![
            Cell::new(&stats.path),
            Cell::new(format_count(stats.total)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(stats.success_2xx)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(stats.client_error_4xx)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(stats.server_error_5xx)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", stats.error_rate))
                .fg(rate_color)
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

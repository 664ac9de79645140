mod bootstrap;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use report_core::config::ReportConfig;
use report_core::models::Dimension;
use report_core::settings::Settings;
use report_data::analysis::analyze_tickets;
use report_export::{export, ExportFormat};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Ticket report v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = ReportConfig::resolve(settings.config.as_deref())
        .context("failed to load pipeline configuration")?;
    if settings.include_open {
        config.restrict_to_closed = false;
    }

    if settings.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let format: ExportFormat = settings.format.parse()?;
    let selections = selections(&settings);

    let result = analyze_tickets(&settings.inputs, &selections, &config)?;

    for failure in &result.failures {
        tracing::warn!("Skipped {}: {}", failure.source_name, failure.reason);
    }
    if result.metadata.unparsable_timestamps > 0 {
        tracing::warn!(
            "{} row(s) without a usable creation time were left out of every table",
            result.metadata.unparsable_timestamps
        );
    }

    let written = export(&result, format, &settings.output)
        .with_context(|| format!("failed to export to {}", settings.output.display()))?;

    for table in &result.tables {
        println!("{:<28} {:>6} rows", table.name, table.len());
    }
    for path in &written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Inclusion sets requested on the command line. Flags that were not given
/// leave their dimension unfiltered.
fn selections(settings: &Settings) -> BTreeMap<Dimension, Vec<String>> {
    let mut selections = BTreeMap::new();
    if let Some(channels) = &settings.channels {
        selections.insert(Dimension::Channel, channels.clone());
    }
    if let Some(lines) = &settings.brand_lines {
        selections.insert(Dimension::BusinessLine, lines.clone());
    }
    selections
}

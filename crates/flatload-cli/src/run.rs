//! Orchestration of one load run.

use std::io::{self, IsTerminal, Write};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use flatload_cli::config::Settings;
use flatload_ingest::{
    LineReader, SourceStats, resolve_encoding, scan_source, validate_encoding,
};
use flatload_load::{
    BatchLoader, Disposition, LoadCounters, LoadOptions, MemorySink, PostgresSink, Sink,
    compute_batch_rows, prepare_table,
};

/// Runs the load described by `settings` to completion.
pub fn run(settings: &Settings) -> anyhow::Result<LoadCounters> {
    validate_encoding(&settings.source)?;
    let stats = scan_source(&settings.source)
        .with_context(|| format!("pre-scanning {}", settings.source.display()))?;
    info!(
        file_size = stats.file_size,
        line_count = stats.line_count,
        "pre-scan complete"
    );

    let disposition = resolve_disposition(settings)?;
    debug!(table = %settings.table, ?disposition, "resolved disposition");

    if settings.dry_run {
        info!("dry run: no database connection will be made");
        let mut sink = MemorySink::discarding();
        execute(settings, &stats, disposition, &mut sink)
    } else {
        let mut sink = PostgresSink::connect(&settings.connect).with_context(|| {
            format!(
                "connecting to {}:{}/{}",
                settings.connect.host, settings.connect.port, settings.connect.dbname
            )
        })?;
        execute(settings, &stats, disposition, &mut sink)
    }
}

fn execute<S: Sink>(
    settings: &Settings,
    stats: &SourceStats,
    disposition: Disposition,
    sink: &mut S,
) -> anyhow::Result<LoadCounters> {
    prepare_table(
        sink,
        settings.dialect,
        &settings.table,
        &settings.schema,
        disposition,
    )?;
    let insert_sql = settings.dialect.insert_sql(&settings.table, &settings.schema);
    debug!(sql = %insert_sql, "insert statement");

    let encoding = resolve_encoding(&settings.encoding)?;
    let mut reader = LineReader::open(&settings.source, encoding, settings.policy)?;
    let options = LoadOptions {
        skip_lines: settings.skip_lines,
        batch_rows: compute_batch_rows(stats, settings.memory_budget),
    };
    let loader = BatchLoader::new(&settings.schema, settings.format, insert_sql, options, sink);

    let bar = progress_bar(stats.line_count);
    let counters = loader.run(&mut reader, |counters| {
        bar.set_position(counters.lines_read);
        if stats.line_count > 0 {
            debug!(
                rows_inserted = counters.rows_inserted,
                percent = counters.lines_read * 100 / stats.line_count,
                "progress"
            );
        }
    })?;
    bar.finish_and_clear();
    Ok(counters)
}

/// Decides what happens to an existing table of the same name, asking
/// on stdin when neither `yes` nor `append` settles it. A dry run never
/// prompts.
fn resolve_disposition(settings: &Settings) -> anyhow::Result<Disposition> {
    if settings.append {
        return Ok(Disposition::Append);
    }
    if settings.yes || settings.dry_run {
        return Ok(Disposition::DropAndCreate);
    }
    print!(
        "Drop if exists and create table {}? Typing 'N' will APPEND to existing table: ",
        settings.table
    );
    io::stdout().flush().context("flushing prompt")?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    let answer = answer.trim();
    Ok(if answer.is_empty() || answer.eq_ignore_ascii_case("y") {
        Disposition::DropAndCreate
    } else {
        Disposition::Append
    })
}

fn progress_bar(total: u64) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    let style =
        ProgressStyle::with_template("{prefix:10} {pos:>10}/{len:<10} [{bar:40}] {percent:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("█ "));
    bar.set_prefix("Loading");
    bar
}

//! The adaptive batch loader.
//!
//! Runs as a small state machine: Priming (skip configured header
//! lines), then Accumulating and Flushing in alternation until the
//! source drains. Rows accumulate into a size-bounded batch; each full
//! batch goes to the sink as one atomic bulk insert.

use tracing::{debug, info, warn};

use flatload_ingest::{LineFormat, LineReader, NextLine, SourceStats, convert_row, split_line};
use flatload_model::{RecordSchema, TypedRow};

use crate::error::Result;
use crate::sink::Sink;
use crate::sql::SqlDialect;

/// Default in-memory batch footprint: 10 MiB.
pub const DEFAULT_MEMORY_BUDGET: u64 = 10 * 1024 * 1024;

/// Rows per batch for a given source, sized so a batch of average lines
/// fits the memory budget. Always at least 1, so pathological inputs
/// (a single enormous line) still make progress row by row.
pub fn compute_batch_rows(stats: &SourceStats, memory_budget: u64) -> usize {
    usize::try_from(memory_budget / stats.average_line_bytes())
        .unwrap_or(usize::MAX)
        .max(1)
}

/// What to do about an existing destination table of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Drop any prior table and create a fresh one.
    DropAndCreate,
    /// Keep the existing table and insert into it.
    Append,
}

/// Applies the disposition to the destination before loading starts.
///
/// # Errors
///
/// A sink failure here is fatal; nothing has been loaded yet.
pub fn prepare_table<S: Sink>(
    sink: &mut S,
    dialect: SqlDialect,
    table: &str,
    schema: &RecordSchema,
    disposition: Disposition,
) -> Result<()> {
    if disposition == Disposition::Append {
        debug!(table, "appending to existing table");
        return Ok(());
    }
    let drop_sql = dialect.drop_table_sql(table);
    debug!(sql = %drop_sql, "dropping prior table");
    sink.execute(&drop_sql)?;
    let create_sql = dialect.create_table_sql(table, schema);
    debug!(sql = %create_sql, "creating table");
    sink.execute(&create_sql)?;
    sink.commit()?;
    Ok(())
}

/// Session counters, monotonically increasing for the run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadCounters {
    /// Lines read from the source, including skipped header lines.
    pub lines_read: u64,
    /// Rows committed to the destination.
    pub rows_inserted: u64,
    /// Lines rejected: decode failures, truncated rows, conversion failures.
    pub rows_rejected: u64,
}

/// Loader knobs resolved from configuration and the pre-scan.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Header lines to skip before the first data line.
    pub skip_lines: u64,
    /// Rows per batch, from [`compute_batch_rows`].
    pub batch_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Priming,
    Accumulating,
    Flushing,
    Drained,
}

/// Drives read → split → convert → batch → bulk insert until the
/// source is exhausted.
pub struct BatchLoader<'a, S: Sink> {
    schema: &'a RecordSchema,
    format: LineFormat,
    insert_sql: String,
    options: LoadOptions,
    sink: &'a mut S,
    counters: LoadCounters,
    batch: Vec<TypedRow>,
}

impl<'a, S: Sink> BatchLoader<'a, S> {
    pub fn new(
        schema: &'a RecordSchema,
        format: LineFormat,
        insert_sql: String,
        options: LoadOptions,
        sink: &'a mut S,
    ) -> Self {
        let batch_rows = options.batch_rows.max(1);
        Self {
            schema,
            format,
            insert_sql,
            options: LoadOptions {
                batch_rows,
                ..options
            },
            sink,
            counters: LoadCounters::default(),
            batch: Vec::with_capacity(batch_rows.min(64 * 1024)),
        }
    }

    /// Runs the load to completion and returns the final counters.
    ///
    /// `on_flush` fires after every committed batch; the CLI hangs its
    /// progress reporting on it.
    ///
    /// # Errors
    ///
    /// Source I/O and sink failures are fatal and propagate; batches
    /// committed before the failure remain committed.
    pub fn run(
        mut self,
        reader: &mut LineReader,
        mut on_flush: impl FnMut(&LoadCounters),
    ) -> Result<LoadCounters> {
        info!(
            batch_rows = self.options.batch_rows,
            skip_lines = self.options.skip_lines,
            "starting load"
        );
        let mut phase = Phase::Priming;
        loop {
            phase = match phase {
                Phase::Priming => self.prime(reader)?,
                Phase::Accumulating => self.accumulate(reader)?,
                Phase::Flushing => {
                    self.flush(&mut on_flush)?;
                    Phase::Accumulating
                }
                Phase::Drained => break,
            };
        }
        info!(
            lines_read = self.counters.lines_read,
            rows_inserted = self.counters.rows_inserted,
            rows_rejected = self.counters.rows_rejected,
            "load drained"
        );
        Ok(self.counters)
    }

    /// Skips the configured header lines. Decode errors here are
    /// ignored; the lines still count as read.
    fn prime(&mut self, reader: &mut LineReader) -> Result<Phase> {
        for _ in 0..self.options.skip_lines {
            match reader.next_line()? {
                NextLine::Eof => return Ok(Phase::Drained),
                NextLine::Line(_) | NextLine::Malformed => {
                    self.counters.lines_read += 1;
                }
            }
        }
        Ok(Phase::Accumulating)
    }

    /// Reads and converts lines until the batch is full or the source
    /// ends. Every rejection is logged with enough context to find the
    /// offending line again.
    fn accumulate(&mut self, reader: &mut LineReader) -> Result<Phase> {
        while self.batch.len() < self.options.batch_rows {
            match reader.next_line()? {
                NextLine::Eof => {
                    return Ok(if self.batch.is_empty() {
                        Phase::Drained
                    } else {
                        Phase::Flushing
                    });
                }
                NextLine::Malformed => {
                    self.counters.lines_read += 1;
                    self.counters.rows_rejected += 1;
                    warn!(
                        line = self.counters.lines_read,
                        "line does not decode under the configured encoding; skipped"
                    );
                }
                NextLine::Line(line) => {
                    self.counters.lines_read += 1;
                    let fields = split_line(&line, &self.format);
                    match convert_row(&fields, self.schema) {
                        Ok(row) => self.batch.push(row),
                        Err(error) => {
                            self.counters.rows_rejected += 1;
                            warn!(
                                line = self.counters.lines_read,
                                raw = %line,
                                %error,
                                "row rejected"
                            );
                        }
                    }
                }
            }
        }
        Ok(Phase::Flushing)
    }

    /// Sends the pending batch as one bulk insert and commits it.
    fn flush(&mut self, on_flush: &mut impl FnMut(&LoadCounters)) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let affected = self.sink.execute_many(&self.insert_sql, &self.batch)?;
        self.sink.commit()?;
        self.counters.rows_inserted += self.batch.len() as u64;
        info!(
            batch = self.batch.len(),
            affected,
            rows_inserted = self.counters.rows_inserted,
            "batch committed"
        );
        self.batch.clear();
        on_flush(&self.counters);
        Ok(())
    }
}

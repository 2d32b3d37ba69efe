//! Destination sink contract and the in-memory implementation.

use flatload_model::TypedRow;

use crate::error::SinkError;

/// A destination that accepts statements and batched rows.
///
/// The loader uses the sink strictly serially: one statement in flight
/// at a time, each batch owned by the loader until `execute_many`
/// returns. Any error is fatal to the run; batches committed earlier
/// stay committed.
pub trait Sink {
    /// Executes a standalone statement (DDL, mostly).
    fn execute(&mut self, sql: &str) -> Result<(), SinkError>;

    /// Executes one parameterized statement over every row of a batch,
    /// atomically. Returns the number of rows the destination reports
    /// as affected.
    fn execute_many(&mut self, sql: &str, rows: &[TypedRow]) -> Result<u64, SinkError>;

    /// Makes prior work durable, where the backend distinguishes this
    /// from statement execution.
    fn commit(&mut self) -> Result<(), SinkError>;
}

/// Records everything it is asked to do; backs tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Standalone statements, in execution order.
    pub statements: Vec<String>,
    /// One entry per `execute_many` call, rows as received.
    pub batches: Vec<Vec<TypedRow>>,
    /// Number of `commit` calls.
    pub commits: usize,
    discard_rows: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that counts batches but drops their rows, so a dry run
    /// over a large file stays memory-bounded.
    pub fn discarding() -> Self {
        Self {
            discard_rows: true,
            ..Self::default()
        }
    }

    /// All inserted rows across batches, in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &TypedRow> {
        self.batches.iter().flatten()
    }
}

impl Sink for MemorySink {
    fn execute(&mut self, sql: &str) -> Result<(), SinkError> {
        self.statements.push(sql.to_string());
        Ok(())
    }

    fn execute_many(&mut self, _sql: &str, rows: &[TypedRow]) -> Result<u64, SinkError> {
        if self.discard_rows {
            self.batches.push(Vec::new());
        } else {
            self.batches.push(rows.to_vec());
        }
        Ok(rows.len() as u64)
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        self.commits += 1;
        Ok(())
    }
}

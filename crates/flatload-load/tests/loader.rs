//! End-to-end load runs against the in-memory sink.

use std::io::Write;

use tempfile::NamedTempFile;

use flatload_ingest::{DecodePolicy, LineFormat, LineReader, resolve_encoding, scan_source};
use flatload_load::{
    BatchLoader, DEFAULT_MEMORY_BUDGET, Disposition, LoadOptions, MemorySink, SqlDialect,
    compute_batch_rows, prepare_table,
};
use flatload_model::{RecordSchema, Value};

fn source_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

fn run_load(
    content: &str,
    manifest: &str,
    options_for: impl Fn(usize) -> LoadOptions,
) -> (flatload_load::LoadCounters, MemorySink) {
    let file = source_file(content);
    let schema = RecordSchema::from_manifest(manifest).unwrap();
    let stats = scan_source(file.path()).unwrap();
    let batch_rows = compute_batch_rows(&stats, DEFAULT_MEMORY_BUDGET);
    let options = options_for(batch_rows);

    let mut sink = MemorySink::new();
    let dialect = SqlDialect::Postgres;
    prepare_table(
        &mut sink,
        dialect,
        "extract",
        &schema,
        Disposition::DropAndCreate,
    )
    .unwrap();

    let mut reader = LineReader::open(
        file.path(),
        resolve_encoding("utf-8").unwrap(),
        DecodePolicy::Strict,
    )
    .unwrap();
    let loader = BatchLoader::new(
        &schema,
        LineFormat::new(',', None, None),
        dialect.insert_sql("extract", &schema),
        options,
        &mut sink,
    );
    let counters = loader.run(&mut reader, |_| {}).unwrap();
    (counters, sink)
}

#[test]
fn loads_good_rows_and_rejects_bad_ones() {
    let (counters, sink) = run_load("A,1\nB,2\nC,x\n", "f1 C, f2 I", |batch_rows| LoadOptions {
        skip_lines: 0,
        batch_rows,
    });

    assert_eq!(counters.lines_read, 3);
    assert_eq!(counters.rows_inserted, 2);
    assert_eq!(counters.rows_rejected, 1);

    // table was dropped and recreated before loading
    assert_eq!(
        sink.statements,
        vec![
            "DROP TABLE IF EXISTS extract".to_string(),
            "CREATE TABLE extract (f1 text,f2 integer)".to_string(),
        ]
    );

    // both good rows landed in a single batch
    assert_eq!(sink.batches.len(), 1);
    let rows: Vec<_> = sink.rows().collect();
    assert_eq!(
        rows,
        vec![
            &vec![Value::Text("A".to_string()), Value::Integer(1)],
            &vec![Value::Text("B".to_string()), Value::Integer(2)],
        ]
    );
}

#[test]
fn flushes_on_batch_boundary_and_commits_per_batch() {
    let (counters, sink) = run_load("A,1\nB,2\nC,3\n", "f1 C, f2 I", |_| LoadOptions {
        skip_lines: 0,
        batch_rows: 2,
    });

    assert_eq!(counters.rows_inserted, 3);
    assert_eq!(sink.batches.len(), 2);
    assert_eq!(sink.batches[0].len(), 2);
    assert_eq!(sink.batches[1].len(), 1);
    // one prepare-commit plus one commit per flushed batch
    assert_eq!(sink.commits, 3);
}

#[test]
fn skips_header_lines_but_counts_them() {
    let (counters, sink) = run_load(
        "name,amount\nA,1\nB,2\n",
        "f1 C, f2 I",
        |batch_rows| LoadOptions {
            skip_lines: 1,
            batch_rows,
        },
    );

    assert_eq!(counters.lines_read, 3);
    assert_eq!(counters.rows_inserted, 2);
    assert_eq!(counters.rows_rejected, 0);
    assert_eq!(sink.rows().count(), 2);
}

#[test]
fn truncated_rows_reject_without_stopping_the_run() {
    let (counters, sink) = run_load(
        "A,1\nB\nC,3\n",
        "f1 C, f2 I",
        |batch_rows| LoadOptions {
            skip_lines: 0,
            batch_rows,
        },
    );

    assert_eq!(counters.lines_read, 3);
    assert_eq!(counters.rows_inserted, 2);
    assert_eq!(counters.rows_rejected, 1);
    assert_eq!(sink.rows().count(), 2);
}

#[test]
fn empty_source_drains_without_inserting() {
    let (counters, sink) = run_load("", "f1 C, f2 I", |batch_rows| LoadOptions {
        skip_lines: 0,
        batch_rows,
    });

    assert_eq!(counters.lines_read, 0);
    assert_eq!(counters.rows_inserted, 0);
    assert_eq!(counters.rows_rejected, 0);
    assert!(sink.batches.is_empty());
}

#[test]
fn empty_fields_load_as_nulls() {
    let (counters, sink) = run_load("A,\n,2\n", "f1 C, f2 I", |batch_rows| LoadOptions {
        skip_lines: 0,
        batch_rows,
    });

    assert_eq!(counters.rows_inserted, 2);
    let rows: Vec<_> = sink.rows().collect();
    assert_eq!(
        rows,
        vec![
            &vec![Value::Text("A".to_string()), Value::Null],
            &vec![Value::Null, Value::Integer(2)],
        ]
    );
}

//! Tests for the rotating writer

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::*;
use crate::ack::{AckEvent, NoopAcknowledger};
use crate::action::{FnAction, MoveFileAction};
use crate::format::DelimitedRecordFormat;
use crate::fs::{LocalFs, MemoryFs};
use crate::naming::DefaultFileNameFormat;
use crate::policy::{
    CountRotationPolicy, CountSyncPolicy, FileSizeRotationPolicy, TimedRotationPolicy,
};

// ============================================================================
// Helpers
// ============================================================================

/// Names targets `/out/{generation}.txt` so tests can address them directly
struct SeqNames;

impl FileNameFormat for SeqNames {
    fn path(&self, generation: u64, _timestamp_ms: i64) -> PathBuf {
        seq_path(generation)
    }
}

fn seq_path(generation: u64) -> PathBuf {
    PathBuf::from(format!("/out/{generation}.txt"))
}

#[derive(Default)]
struct Calls {
    marks: AtomicUsize,
    triggers: AtomicUsize,
    resets: AtomicUsize,
}

impl Calls {
    fn get(&self) -> (usize, usize, usize) {
        (
            self.marks.load(Ordering::SeqCst),
            self.triggers.load(Ordering::SeqCst),
            self.resets.load(Ordering::SeqCst),
        )
    }
}

struct SpySync {
    inner: CountSyncPolicy,
    calls: Arc<Calls>,
}

impl SyncPolicy for SpySync {
    fn mark(&mut self, record: &Record, offset: u64) -> bool {
        self.calls.marks.fetch_add(1, Ordering::SeqCst);
        let fired = self.inner.mark(record, offset);
        if fired {
            self.calls.triggers.fetch_add(1, Ordering::SeqCst);
        }
        fired
    }

    fn reset(&mut self) {
        self.calls.resets.fetch_add(1, Ordering::SeqCst);
        self.inner.reset();
    }
}

struct SpyRotation {
    inner: CountRotationPolicy,
    calls: Arc<Calls>,
    offsets: Arc<Mutex<Vec<u64>>>,
}

impl RotationPolicy for SpyRotation {
    fn mark(&mut self, record: &Record, offset: u64) -> bool {
        self.calls.marks.fetch_add(1, Ordering::SeqCst);
        self.offsets.lock().push(offset);
        let fired = self.inner.mark(record, offset);
        if fired {
            self.calls.triggers.fetch_add(1, Ordering::SeqCst);
        }
        fired
    }

    fn reset(&mut self) {
        self.calls.resets.fetch_add(1, Ordering::SeqCst);
        self.inner.reset();
    }
}

#[derive(Default)]
struct RecordingAcker {
    events: Mutex<Vec<AckEvent>>,
}

impl RecordingAcker {
    fn events(&self) -> Vec<AckEvent> {
        self.events.lock().clone()
    }
}

impl Acknowledger for RecordingAcker {
    fn ack(&self, record: &Record) {
        self.events.lock().push(AckEvent::Ack(record.id()));
    }

    fn fail(&self, record: &Record) {
        self.events.lock().push(AckEvent::Fail(record.id()));
    }
}

struct Fixture {
    fs: MemoryFs,
    acker: Arc<RecordingAcker>,
    sync: Arc<Calls>,
    rotation: Arc<Calls>,
    rotation_offsets: Arc<Mutex<Vec<u64>>>,
    writer: RotatingWriter,
}

/// Writer over `MemoryFs` with spied count policies
fn fixture(sync_every: u64, rotate_every: u64) -> Fixture {
    fixture_with(sync_every, rotate_every, Vec::new())
}

fn fixture_with(
    sync_every: u64,
    rotate_every: u64,
    actions: Vec<Box<dyn RotationAction>>,
) -> Fixture {
    let fs = MemoryFs::new();
    let acker = Arc::new(RecordingAcker::default());
    let sync = Arc::new(Calls::default());
    let rotation = Arc::new(Calls::default());
    let rotation_offsets = Arc::new(Mutex::new(Vec::new()));

    let mut config = WriterConfig::new(
        SeqNames,
        DelimitedRecordFormat::new(),
        SpySync {
            inner: CountSyncPolicy::new(sync_every),
            calls: Arc::clone(&sync),
        },
        SpyRotation {
            inner: CountRotationPolicy::new(rotate_every),
            calls: Arc::clone(&rotation),
            offsets: Arc::clone(&rotation_offsets),
        },
    )
    .with_id("w");
    for action in actions {
        config = config.with_boxed_action(action);
    }

    let writer = RotatingWriter::open(
        Arc::new(fs.clone()),
        config,
        Arc::clone(&acker) as Arc<dyn Acknowledger>,
    )
    .unwrap();

    Fixture {
        fs,
        acker,
        sync,
        rotation,
        rotation_offsets,
        writer,
    }
}

/// 10-byte record once the delimiter is appended
fn record(i: u64) -> Record {
    Record::single(RecordId::new(i), format!("record-{i:02}").into_bytes())
}

fn ack(i: u64) -> AckEvent {
    AckEvent::Ack(RecordId::new(i))
}

fn fail(i: u64) -> AckEvent {
    AckEvent::Fail(RecordId::new(i))
}

// ============================================================================
// Open
// ============================================================================

#[test]
fn test_open_creates_generation_zero() {
    let f = fixture(100, 100);

    assert_eq!(f.writer.id(), "w");
    assert_eq!(f.writer.generation(), Some(0));
    assert_eq!(f.writer.offset(), 0);
    assert_eq!(f.writer.current_path(), Some(seq_path(0)));
    assert!(f.fs.is_open(&seq_path(0)));
    assert!(!f.writer.is_closed());
}

#[test]
fn test_open_failure_is_fatal() {
    let fs = MemoryFs::new();
    fs.fail_next_create();

    let config = WriterConfig::new(
        SeqNames,
        DelimitedRecordFormat::new(),
        CountSyncPolicy::new(1),
        CountRotationPolicy::new(1),
    );
    let result = RotatingWriter::open(Arc::new(fs.clone()), config, Arc::new(NoopAcknowledger));

    assert!(matches!(result, Err(SinkError::Open { .. })));
    assert_eq!(fs.open_count(), 0);
}

#[test]
fn test_open_calls_prepare_with_writer_id() {
    let fs = MemoryFs::new();
    let config = WriterConfig::new(
        DefaultFileNameFormat::new("/out").with_prefix("p-"),
        DelimitedRecordFormat::new(),
        CountSyncPolicy::new(1),
        CountRotationPolicy::new(100),
    )
    .with_id("ingest-3");

    let writer =
        RotatingWriter::open(Arc::new(fs), config, Arc::new(NoopAcknowledger)).unwrap();
    let name = writer.current_path().unwrap();
    let name = name.file_name().unwrap().to_string_lossy().into_owned();

    assert!(name.starts_with("p-ingest-3-0-"), "{name}");
    assert!(name.ends_with(".txt"), "{name}");
}

// ============================================================================
// Write path
// ============================================================================

#[test]
fn test_offset_tracks_appended_bytes() {
    let f = fixture(100, 100);

    for i in 0..5 {
        let receipt = f.writer.write(&record(i)).unwrap();
        assert_eq!(receipt.bytes, 10);
        assert_eq!(receipt.offset, (i + 1) * 10);
        assert_eq!(receipt.generation, 0);
        assert!(receipt.rotation.is_none());
    }

    assert_eq!(f.writer.offset(), 50);
    assert_eq!(f.fs.contents(&seq_path(0)).unwrap().len(), 50);
}

#[test]
fn test_each_record_is_acked_or_failed_once() {
    let f = fixture(100, 100);

    f.writer.write(&record(0)).unwrap();
    f.fs.fail_next_append();
    f.writer.write(&record(1)).unwrap_err();
    f.writer.write(&record(2)).unwrap();

    assert_eq!(f.acker.events(), vec![ack(0), fail(1), ack(2)]);

    let snapshot = f.writer.metrics().snapshot();
    assert_eq!(snapshot.records_received, 3);
    assert_eq!(snapshot.records_acked, 2);
    assert_eq!(snapshot.records_failed, 1);
    assert_eq!(snapshot.bytes_written, 20);
}

#[test]
fn test_sync_every_two_rotate_every_three() {
    let f = fixture(2, 3);

    let receipts: Vec<WriteReceipt> = (1..=6).map(|i| f.writer.write(&record(i)).unwrap()).collect();

    let synced: Vec<bool> = receipts.iter().map(|r| r.synced).collect();
    assert_eq!(synced, vec![false, true, false, true, false, true]);

    let offsets: Vec<u64> = receipts.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![10, 20, 30, 10, 20, 30]);

    let generations: Vec<u64> = receipts.iter().map(|r| r.generation).collect();
    assert_eq!(generations, vec![0, 0, 0, 1, 1, 1]);

    let rotated: Vec<bool> = receipts.iter().map(|r| r.rotation.is_some()).collect();
    assert_eq!(rotated, vec![false, false, true, false, false, true]);

    // Policies observe the per-generation offset
    assert_eq!(*f.rotation_offsets.lock(), vec![10, 20, 30, 10, 20, 30]);

    assert_eq!(f.writer.generation(), Some(2));
    assert_eq!(f.writer.offset(), 0);
    assert_eq!(f.fs.contents(&seq_path(0)).unwrap().len(), 30);
    assert_eq!(f.fs.contents(&seq_path(1)).unwrap().len(), 30);
    assert!(!f.fs.is_open(&seq_path(0)));
    assert!(!f.fs.is_open(&seq_path(1)));
    assert!(f.fs.is_open(&seq_path(2)));

    assert_eq!(f.acker.events(), (1..=6).map(ack).collect::<Vec<_>>());
}

#[test]
fn test_append_failure_leaves_state_untouched() {
    let f = fixture(2, 3);

    f.writer.write(&record(1)).unwrap();
    f.writer.write(&record(2)).unwrap();
    let sync_before = f.sync.get();
    let rotation_before = f.rotation.get();

    f.fs.fail_next_append();
    let err = f.writer.write(&record(3)).unwrap_err();
    assert!(matches!(err, SinkError::WriteFailed { .. }));
    assert!(err.is_record_failure());

    assert_eq!(f.writer.offset(), 20);
    assert_eq!(f.sync.get(), sync_before);
    assert_eq!(f.rotation.get(), rotation_before);

    let receipt = f.writer.write(&record(4)).unwrap();
    assert_eq!(receipt.offset, 30);
    assert!(receipt.rotation.is_some());

    assert_eq!(f.acker.events(), vec![ack(1), ack(2), fail(3), ack(4)]);
}

#[test]
fn test_sync_failure_fails_record_but_keeps_bytes() {
    let f = fixture(1, 100);

    f.fs.fail_next_sync();
    let err = f.writer.write(&record(1)).unwrap_err();
    assert!(matches!(err, SinkError::WriteFailed { .. }));

    // Bytes reached the target, only durability failed
    assert_eq!(f.writer.offset(), 10);
    assert_eq!(f.fs.durable_len(&seq_path(0)), Some(0));
    assert_eq!(f.sync.get(), (1, 1, 0));

    f.writer.write(&record(2)).unwrap();
    assert_eq!(f.fs.durable_len(&seq_path(0)), Some(20));
    assert_eq!(f.sync.get(), (2, 2, 1));

    assert_eq!(f.acker.events(), vec![fail(1), ack(2)]);

    // Both records' bytes reached the target
    let snapshot = f.writer.metrics().snapshot();
    assert_eq!(snapshot.bytes_written, 20);
    assert_eq!(snapshot.records_acked, 1);
    assert_eq!(snapshot.records_failed, 1);
}

#[test]
fn test_synced_bytes_are_durable() {
    let f = fixture(2, 100);

    f.writer.write(&record(1)).unwrap();
    assert_eq!(f.fs.durable_len(&seq_path(0)), Some(0));

    f.writer.write(&record(2)).unwrap();
    assert_eq!(f.fs.durable_len(&seq_path(0)), Some(20));
    assert_eq!(f.writer.metrics().snapshot().syncs, 1);
}

#[test]
fn test_serialization_failure_fails_record() {
    let fs = MemoryFs::new();
    let acker = Arc::new(RecordingAcker::default());
    let config = WriterConfig::new(
        SeqNames,
        DelimitedRecordFormat::new().with_fields(vec![0, 3]),
        CountSyncPolicy::new(1),
        CountRotationPolicy::new(100),
    );
    let writer = RotatingWriter::open(
        Arc::new(fs.clone()),
        config,
        Arc::clone(&acker) as Arc<dyn Acknowledger>,
    )
    .unwrap();

    let err = writer.write(&record(1)).unwrap_err();

    assert!(matches!(err, SinkError::Serialization(_)));
    assert_eq!(writer.offset(), 0);
    assert_eq!(fs.contents(&seq_path(0)), Some(Vec::new()));
    assert_eq!(acker.events(), vec![fail(1)]);
}

// ============================================================================
// Policies
// ============================================================================

#[test]
fn test_policy_resets_match_triggers() {
    let f = fixture(3, 4);

    for i in 0..25 {
        f.writer.write(&record(i)).unwrap();
    }

    let (sync_marks, sync_triggers, sync_resets) = f.sync.get();
    assert_eq!(sync_marks, 25);
    assert_eq!(sync_triggers, 8);
    assert_eq!(sync_resets, sync_triggers);

    let (rotation_marks, rotation_triggers, rotation_resets) = f.rotation.get();
    assert_eq!(rotation_marks, 25);
    assert_eq!(rotation_triggers, 6);
    assert_eq!(rotation_resets, rotation_triggers);
}

#[test]
fn test_rotation_resets_offset() {
    let f = fixture(100, 2);

    f.writer.write(&record(1)).unwrap();
    let receipt = f.writer.write(&record(2)).unwrap();
    let report = receipt.rotation.unwrap().unwrap();

    assert_eq!(report.closed_generation, 0);
    assert_eq!(report.closed_path, seq_path(0));
    assert_eq!(report.closed_bytes, 20);
    assert_eq!(report.new_generation, 1);
    assert_eq!(report.new_path, seq_path(1));
    assert!(report.is_clean());

    assert_eq!(f.writer.offset(), 0);
    assert_eq!(f.writer.write(&record(3)).unwrap().offset, 10);
}

#[test]
fn test_size_rotation_with_default_naming() {
    let fs = MemoryFs::new();
    let config = WriterConfig::new(
        DefaultFileNameFormat::new("/out"),
        DelimitedRecordFormat::new(),
        CountSyncPolicy::new(1),
        FileSizeRotationPolicy::from_bytes(25),
    )
    .with_id("w");
    let writer =
        RotatingWriter::open(Arc::new(fs.clone()), config, Arc::new(NoopAcknowledger)).unwrap();

    for i in 0..6 {
        writer.write(&record(i)).unwrap();
    }
    writer.close().unwrap();

    let sizes: Vec<usize> = fs
        .paths()
        .iter()
        .map(|p| fs.contents(p).unwrap().len())
        .collect();
    assert_eq!(sizes, vec![30, 30, 0]);
}

// ============================================================================
// Rotation actions
// ============================================================================

fn recording_action(
    name: &'static str,
    log: &Arc<Mutex<Vec<(String, PathBuf)>>>,
    fails: bool,
) -> Box<dyn RotationAction> {
    let log = Arc::clone(log);
    Box::new(FnAction::new(name, move |path: &Path| {
        log.lock().push((name.to_string(), path.to_path_buf()));
        if fails {
            Err(io::Error::other("action broke"))
        } else {
            Ok(())
        }
    }))
}

#[test]
fn test_actions_run_in_order_and_failures_are_isolated() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let f = fixture_with(
        100,
        1,
        vec![
            recording_action("a", &log, false),
            recording_action("b", &log, true),
            recording_action("c", &log, false),
        ],
    );

    let report = f.writer.write(&record(1)).unwrap().rotation.unwrap().unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            ("a".to_string(), seq_path(0)),
            ("b".to_string(), seq_path(0)),
            ("c".to_string(), seq_path(0)),
        ]
    );
    assert!(!report.is_clean());
    assert_eq!(report.action_errors.len(), 1);
    match &report.action_errors[0] {
        SinkError::RotationActionFailed { action, path, .. } => {
            assert_eq!(action, "b");
            assert_eq!(path, &seq_path(0));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Rotation completed regardless
    assert_eq!(f.writer.generation(), Some(1));
    assert_eq!(f.writer.metrics().snapshot().action_failures, 1);
    assert_eq!(f.acker.events(), vec![ack(1)]);
}

#[test]
fn test_actions_run_on_every_rotation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let f = fixture_with(100, 1, vec![recording_action("a", &log, false)]);

    for i in 0..3 {
        f.writer.write(&record(i)).unwrap();
    }

    let paths: Vec<PathBuf> = log.lock().iter().map(|(_, p)| p.clone()).collect();
    assert_eq!(paths, vec![seq_path(0), seq_path(1), seq_path(2)]);
}

// ============================================================================
// Rotation failures
// ============================================================================

#[test]
fn test_failed_rotation_keeps_current_target() {
    let f = fixture(100, 2);

    f.writer.write(&record(1)).unwrap();
    f.fs.fail_next_create();
    let receipt = f.writer.write(&record(2)).unwrap();

    // The record is acknowledged even though its rotation failed
    let err = receipt.rotation.unwrap().unwrap_err();
    assert!(matches!(err, SinkError::RotationFailed { .. }));
    assert_eq!(f.acker.events(), vec![ack(1), ack(2)]);

    assert_eq!(f.writer.generation(), Some(0));
    assert_eq!(f.writer.offset(), 20);
    assert!(f.fs.is_open(&seq_path(0)));
    assert_eq!(f.rotation.get().2, 0);

    // Policy was not reset, so the next write retries; generation 1 is spent
    let report = f.writer.write(&record(3)).unwrap().rotation.unwrap().unwrap();
    assert_eq!(report.closed_bytes, 30);
    assert_eq!(report.new_generation, 2);
    assert_eq!(report.new_path, seq_path(2));

    let snapshot = f.writer.metrics().snapshot();
    assert_eq!(snapshot.rotation_failures, 1);
    assert_eq!(snapshot.rotations, 1);
}

#[test]
fn test_close_failure_is_reported() {
    let f = fixture(100, 1);

    f.fs.fail_next_close();
    let report = f.writer.write(&record(1)).unwrap().rotation.unwrap().unwrap();

    assert!(matches!(report.close_error, Some(SinkError::CloseFailed { .. })));
    assert_eq!(report.errors().count(), 1);
    assert_eq!(f.writer.generation(), Some(1));
    assert!(f.fs.is_open(&seq_path(0)));
    assert_eq!(f.writer.metrics().snapshot().close_failures, 1);
}

// ============================================================================
// Forced and time-driven rotation
// ============================================================================

#[test]
fn test_forced_rotation() {
    let f = fixture(100, 100);
    f.writer.write(&record(1)).unwrap();

    let report = f.writer.rotate().unwrap();

    assert_eq!(report.closed_bytes, 10);
    assert_eq!(report.new_generation, 1);
    assert_eq!(f.writer.offset(), 0);
    assert_eq!(f.rotation.get().2, 1);
}

#[test]
fn test_poll_rotation() {
    let f = fixture(100, 100);
    assert_eq!(f.writer.poll_interval(), None);
    assert!(f.writer.poll_rotation().unwrap().is_none());

    let fs = MemoryFs::new();
    let config = WriterConfig::new(
        SeqNames,
        DelimitedRecordFormat::new(),
        CountSyncPolicy::new(1),
        TimedRotationPolicy::new(Duration::ZERO),
    );
    let timed =
        RotatingWriter::open(Arc::new(fs.clone()), config, Arc::new(NoopAcknowledger)).unwrap();

    assert_eq!(timed.poll_interval(), Some(Duration::ZERO));
    let report = timed.poll_rotation().unwrap().unwrap();
    assert_eq!(report.closed_bytes, 0);
    assert_eq!(timed.generation(), Some(1));
    assert!(!fs.is_open(&seq_path(0)));
}

#[test]
fn test_idle_timed_policy_does_not_rotate() {
    let config = WriterConfig::new(
        SeqNames,
        DelimitedRecordFormat::new(),
        CountSyncPolicy::new(1),
        TimedRotationPolicy::new(Duration::from_secs(3600)),
    );
    let writer =
        RotatingWriter::open(Arc::new(MemoryFs::new()), config, Arc::new(NoopAcknowledger))
            .unwrap();

    assert!(writer.poll_rotation().unwrap().is_none());
    assert!(writer.write(&record(1)).unwrap().rotation.is_none());
}

// ============================================================================
// Close
// ============================================================================

#[test]
fn test_writes_after_close_fail() {
    let f = fixture(100, 100);
    f.writer.write(&record(1)).unwrap();

    f.writer.close().unwrap();
    f.writer.close().unwrap();

    assert!(f.writer.is_closed());
    assert!(!f.fs.is_open(&seq_path(0)));
    assert_eq!(f.fs.durable_len(&seq_path(0)), Some(10));

    let err = f.writer.write(&record(2)).unwrap_err();
    assert!(matches!(err, SinkError::Closed));
    assert!(matches!(f.writer.rotate(), Err(SinkError::Closed)));
    assert!(f.writer.poll_rotation().unwrap().is_none());
    assert_eq!(f.acker.events(), vec![ack(1), fail(2)]);
}

#[test]
fn test_drop_closes_open_target() {
    let f = fixture(100, 100);
    f.writer.write(&record(1)).unwrap();
    let fs = f.fs.clone();

    drop(f);

    assert!(!fs.is_open(&seq_path(0)));
    assert_eq!(fs.durable_len(&seq_path(0)), Some(10));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_writes_are_not_interleaved() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 200;

    let f = fixture(7, 50);

    std::thread::scope(|scope| {
        for t in 0..THREADS {
            let writer = &f.writer;
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    let id = t * PER_THREAD + i;
                    let record =
                        Record::single(RecordId::new(id), format!("r-{t}-{i:04}").into_bytes());
                    writer.write(&record).unwrap();
                }
            });
        }
    });

    let total = THREADS * PER_THREAD;
    let mut seen = HashSet::new();
    let mut bytes = 0;
    for path in f.fs.paths() {
        let data = f.fs.contents(&path).unwrap();
        bytes += data.len();
        for line in data.split(|b| *b == b'\n').filter(|l| !l.is_empty()) {
            let line = String::from_utf8(line.to_vec()).unwrap();
            assert!(line.starts_with("r-") && line.len() == 8, "{line}");
            assert!(seen.insert(line));
        }
    }

    assert_eq!(bytes as u64, total * 9);
    assert_eq!(seen.len() as u64, total);

    // Writers skip the decision while a rotation is pending
    let (marks, triggers, resets) = f.rotation.get();
    assert!(marks as u64 <= total);
    assert!(triggers > 0);
    assert_eq!(triggers, resets);
    assert_eq!(f.writer.metrics().snapshot().rotations, resets as u64);
    assert_eq!(f.acker.events().len() as u64, total);
}

#[test]
fn test_actions_block_rotations_but_not_writes() {
    let (entered_tx, entered) = std::sync::mpsc::channel::<PathBuf>();
    let (release, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let gate = FnAction::new("gate", move |path: &Path| {
        let _ = entered_tx.send(path.to_path_buf());
        let _ = release_rx.lock().recv();
        Ok(())
    });

    let actions: Vec<Box<dyn RotationAction>> = vec![Box::new(gate)];
    let f = fixture_with(100, 100, actions);
    let writer = &f.writer;
    let wait = Duration::from_secs(5);

    std::thread::scope(|scope| {
        let first = scope.spawn(move || writer.rotate());
        assert_eq!(entered.recv_timeout(wait).unwrap(), seq_path(0));

        // New target already takes writes while the action holds the rotation
        let receipt = writer.write(&record(1)).unwrap();
        assert_eq!(receipt.generation, 1);
        assert_eq!(receipt.offset, 10);

        let second = scope.spawn(move || writer.rotate());
        std::thread::sleep(Duration::from_millis(50));
        assert!(!second.is_finished());
        assert!(entered.try_recv().is_err());
        assert_eq!(writer.generation(), Some(1));

        release.send(()).unwrap();
        let report = first.join().unwrap().unwrap();
        assert_eq!(report.closed_generation, 0);
        assert_eq!(report.new_generation, 1);

        assert_eq!(entered.recv_timeout(wait).unwrap(), seq_path(1));
        release.send(()).unwrap();
        let report = second.join().unwrap().unwrap();
        assert_eq!(report.closed_generation, 1);
        assert_eq!(report.closed_bytes, 10);
        assert_eq!(report.new_generation, 2);
    });

    assert_eq!(f.fs.contents(&seq_path(1)).unwrap(), b"record-01\n");
    assert_eq!(f.acker.events(), vec![ack(1)]);
}

// ============================================================================
// On disk
// ============================================================================

#[test]
fn test_local_fs_rotation_with_move_action() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let done = temp.path().join("done");

    let config = WriterConfig::new(
        DefaultFileNameFormat::new(&out),
        DelimitedRecordFormat::new(),
        CountSyncPolicy::new(2),
        CountRotationPolicy::new(2),
    )
    .with_id("w")
    .with_action(MoveFileAction::new(&done));
    let writer =
        RotatingWriter::open(Arc::new(LocalFs::default()), config, Arc::new(NoopAcknowledger))
            .unwrap();

    for i in 0..4 {
        writer.write(&record(i)).unwrap();
    }
    writer.close().unwrap();

    let mut finished: Vec<PathBuf> = std::fs::read_dir(&done)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    finished.sort();
    assert_eq!(finished.len(), 2);
    assert_eq!(
        std::fs::read_to_string(&finished[0]).unwrap(),
        "record-00\nrecord-01\n"
    );
    assert_eq!(
        std::fs::read_to_string(&finished[1]).unwrap(),
        "record-02\nrecord-03\n"
    );

    // Only the empty current generation stays behind
    let remaining: Vec<PathBuf> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(std::fs::metadata(&remaining[0]).unwrap().len(), 0);
}

//! Tests for Log Recovery
//!
//! These tests verify:
//! - Recovery from a clean log
//! - Recovery from an empty log
//! - Recovery with partial writes (truncated tail)
//! - Recovery with corrupted entries (CRC mismatch)
//! - Verify mode (stats only, file untouched)

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use ledgerboard::config::LogSyncStrategy;
use ledgerboard::store::log::{LogEntry, LogOp, LogRecovery, LogWriter, HEADER_SIZE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("ledger.log");
    (temp_dir, log_path)
}

/// Write entries using LogWriter (produces a well-formed log)
fn write_entries_via_writer(path: &Path, count: usize) {
    let mut writer = LogWriter::open(path, LogSyncStrategy::EveryWrite, 1).unwrap();
    for i in 0..count {
        writer
            .append(LogOp::Put {
                key: format!("COMMENT{}", i),
                value: format!("{{\"body\":\"{}\"}}", i).into_bytes(),
            })
            .unwrap();
    }
}

/// Write raw serialized entries directly to a file (for crafting corruption)
fn write_raw_entries(path: &Path, entries: &[LogEntry]) {
    let mut file = File::create(path).unwrap();
    for entry in entries {
        file.write_all(&entry.serialize().unwrap()).unwrap();
    }
    file.sync_all().unwrap();
}

fn put(lsn: u64, key: &str) -> LogEntry {
    LogEntry::new(
        lsn,
        LogOp::Put {
            key: key.to_string(),
            value: b"v".to_vec(),
        },
    )
}

// =============================================================================
// Recover: Clean Log Tests
// =============================================================================

#[test]
fn test_recover_empty_file() {
    let (_temp, log_path) = setup_temp_log();
    File::create(&log_path).unwrap();

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_clean_log_in_order() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 5);

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 5);
    assert_eq!(result.entries_recovered, 5);
    assert_eq!(result.last_lsn, 5);
    assert!(!result.was_truncated);

    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.lsn, i as u64 + 1);
        assert_eq!(entry.op.key(), format!("COMMENT{}", i));
    }
}

#[test]
fn test_writer_continues_lsn_after_reopen() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 3);

    let (_, result) = LogRecovery::recover(&log_path).unwrap();
    let mut writer =
        LogWriter::open(&log_path, LogSyncStrategy::EveryWrite, result.last_lsn + 1).unwrap();
    let lsn = writer
        .append(LogOp::Remove {
            key: "COMMENT0".to_string(),
        })
        .unwrap();
    assert_eq!(lsn, 4);
    assert_eq!(writer.next_lsn(), 5);
    drop(writer);

    let (entries, _) = LogRecovery::recover(&log_path).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(matches!(entries[3].op, LogOp::Remove { .. }));
}

// =============================================================================
// Recover: Partial Write Tests
// =============================================================================

#[test]
fn test_recover_partial_header() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 2);
    let clean_len = fs::metadata(&log_path).unwrap().len();

    {
        let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
        file.write_all(&vec![0xAB; HEADER_SIZE - 1]).unwrap();
    }

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(result.entries_corrupted, 0);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_partial_payload() {
    let (_temp, log_path) = setup_temp_log();
    let full = put(1, "TOPIC0").serialize().unwrap();
    let second = put(2, "TOPIC1").serialize().unwrap();

    {
        let mut file = File::create(&log_path).unwrap();
        file.write_all(&full).unwrap();
        file.write_all(&second[..second.len() - 3]).unwrap();
    }

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(result.last_lsn, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), full.len() as u64);
}

// =============================================================================
// Recover: Corruption Tests
// =============================================================================

#[test]
fn test_recover_stops_at_checksum_mismatch() {
    let (_temp, log_path) = setup_temp_log();
    write_raw_entries(
        &log_path,
        &[put(1, "TOPIC0"), put(2, "TOPIC1"), put(3, "TOPIC2")],
    );

    // Flip a payload byte inside the second entry
    let mut bytes = fs::read(&log_path).unwrap();
    let first_len = put(1, "TOPIC0").serialize().unwrap().len();
    bytes[first_len + HEADER_SIZE + 2] ^= 0xFF;
    fs::write(&log_path, &bytes).unwrap();

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(result.entries_recovered, 1);
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(result.last_lsn, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), first_len as u64);
}

#[test]
fn test_recover_rejects_oversized_length() {
    let (_temp, log_path) = setup_temp_log();

    let mut header = vec![0u8; HEADER_SIZE];
    header[0] = 1;
    header[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
    fs::write(&log_path, &header).unwrap();

    let (entries, result) = LogRecovery::recover(&log_path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(fs::metadata(&log_path).unwrap().len(), 0);
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_agrees_with_recover_without_truncating() {
    let (_temp, log_path) = setup_temp_log();
    write_entries_via_writer(&log_path, 3);
    {
        let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
    }
    let len_before = fs::metadata(&log_path).unwrap().len();

    let verified = LogRecovery::verify(&log_path).unwrap();
    assert_eq!(fs::metadata(&log_path).unwrap().len(), len_before);

    let (_, recovered) = LogRecovery::recover(&log_path).unwrap();
    assert_eq!(verified, recovered);
    assert_eq!(verified.entries_recovered, 3);
    assert!(verified.was_truncated);
}

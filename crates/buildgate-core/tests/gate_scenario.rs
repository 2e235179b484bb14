//! End-to-end gate scenarios with in-process and file-backed locks.

use std::{sync::Arc, time::Duration};

use buildgate_core::{
    BuildLifecycle, FileLock, GateState, LockGate, MutualExclusionLock, ProcessLock, SharedLock,
};

#[test]
fn gate_waits_for_external_holder_then_releases_at_batch_end() -> Result<(), Box<dyn std::error::Error>> {
    let lock: SharedLock = Arc::new(ProcessLock::new());
    let mut gate = LockGate::new(Arc::clone(&lock));

    // Someone else (a restore) holds the lock
    let external = lock.try_acquire(Duration::ZERO)?.ok_or("lock should be free")?;
    assert!(gate.query_delay_first_action());
    assert!(gate.query_delay_first_action());
    assert_eq!(gate.state(), GateState::Unlocked);

    // Holder finishes, next poll gets through
    drop(external);
    assert!(!gate.query_delay_first_action());
    assert_eq!(gate.state(), GateState::Locked);

    gate.begin_first_action();
    gate.begin_action(1);
    gate.end_action(1);
    gate.end_last_action();

    // A different contender can now take it
    let mut other_gate = LockGate::new(Arc::clone(&lock));
    assert!(!other_gate.query_delay_first_action());
    other_gate.end_last_action();
    assert!(!lock.is_held());
    Ok(())
}

#[test]
fn two_gates_on_one_lock_take_turns() {
    let lock = ProcessLock::new();
    let mut first = LockGate::new(lock.clone());
    let mut second = LockGate::new(lock.clone());

    assert!(!first.query_delay());
    assert!(second.query_delay());

    first.on_batch_end();
    assert!(!second.query_delay());
    assert!(first.query_delay());

    second.on_batch_end();
    assert!(!lock.is_held());
}

#[test]
fn file_lock_gates_exclude_each_other() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut build_gate = LockGate::new(FileLock::new(dir.path())?);
    let restore_side = FileLock::new(dir.path())?;

    let restore = restore_side
        .try_acquire(Duration::ZERO)?
        .ok_or("file lock should be free")?;
    assert!(build_gate.lock().is_held());
    assert!(build_gate.query_delay());
    assert_eq!(restore_side.holder_pid()?, Some(std::process::id()));

    drop(restore);
    assert!(!build_gate.query_delay());
    assert!(restore_side.is_held());
    assert!(restore_side.try_acquire(Duration::ZERO)?.is_none());

    build_gate.on_batch_end();
    assert!(!restore_side.is_held());
    Ok(())
}

#[test]
fn file_lock_timeout_waits_for_holder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let holder = FileLock::new(dir.path())?;
    let contender = FileLock::new(dir.path())?.with_poll_interval(Duration::from_millis(5));

    let token = holder.try_acquire(Duration::ZERO)?.ok_or("file lock should be free")?;
    let waiter = std::thread::spawn(move || contender.try_acquire(Duration::from_secs(5)));

    std::thread::sleep(Duration::from_millis(50));
    drop(token);

    let acquired = waiter.join().map_err(|_| "waiter panicked")??;
    assert!(acquired.is_some());
    Ok(())
}

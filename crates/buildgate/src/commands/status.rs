//! Lock and settings overview

use anyhow::Result;
use buildgate_core::{FileLock, LockKind, MutualExclusionLock};

use super::Project;

pub fn run() -> Result<()> {
    let project = Project::load()?;
    let config = &project.config;

    match config.lock.kind {
        LockKind::File => {
            let lock = FileLock::new(&config.lock.dir).map_err(buildgate_core::Error::from)?;
            println!("lock:      file {}", lock.path().display());
            let state = if lock.is_held() {
                match lock.holder_pid().map_err(buildgate_core::Error::from)? {
                    Some(pid) => format!("held by pid {pid}"),
                    None => "held".to_string(),
                }
            } else {
                "free".to_string()
            };
            println!("state:     {state}");
        }
        LockKind::Process => {
            println!("lock:      process (local to each buildgate run)");
            println!("state:     free");
        }
    }

    println!("on build:  {}", on_off(config.restore.on_build));
    println!("restore:   {}", config.restore.command.join(" "));
    println!(
        "gate:      poll {}ms, give up after {}ms",
        config.gate.poll_interval_ms, config.gate.max_wait_ms
    );
    Ok(())
}

const fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

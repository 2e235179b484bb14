//! Dispatch from parsed arguments to command implementations

use std::str::FromStr;

use anyhow::Result;
use buildgate_core::{BuildAction, BuildScope};
use clap::ArgMatches;

use super::commands::build_cli;
use crate::commands::{build, config, restore, status};

/// Render an error with its cause when the message does not already say it.
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}

pub async fn run_cli() -> Result<()> {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("status", _)) => status::run(),
        Some(("build", sub_m)) => handle_build(sub_m).await,
        Some(("restore", sub_m)) => handle_restore(sub_m).await,
        Some(("config", _)) => config::run(),
        Some((other, _)) => anyhow::bail!("Unknown command: {other}"),
        None => anyhow::bail!("No command given"),
    }
}

async fn handle_build(sub_m: &ArgMatches) -> Result<()> {
    let action = sub_m
        .get_one::<String>("action")
        .map_or(Ok(BuildAction::Build), |s| BuildAction::from_str(s))?;
    let scope = sub_m
        .get_one::<String>("scope")
        .map_or(Ok(BuildScope::Solution), |s| BuildScope::from_str(s))?;
    let command = sub_m
        .get_many::<String>("command")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    build::run(build::BuildOptions {
        action,
        scope,
        no_restore: sub_m.get_flag("no-restore"),
        command,
    })
    .await
}

async fn handle_restore(sub_m: &ArgMatches) -> Result<()> {
    restore::run(sub_m.get_flag("force")).await
}

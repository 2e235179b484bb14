//! Clap command definitions

use clap::{Arg, ArgAction, Command as ClapCommand};

pub fn build_cli() -> ClapCommand {
    ClapCommand::new("buildgate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Buildgate Contributors")
        .about("Run builds and dependency restores without stepping on each other")
        .long_about(
            "buildgate holds a build back while a dependency restore owns the shared lock,\n\
            and queues a restore when a build starts and restores are enabled.\n\n\
            Core workflow:\n  \
              buildgate build -- cargo build     Gate a build behind the restore lock\n  \
              buildgate restore --force          Run a restore now\n  \
              buildgate status                   Show who holds the lock",
        )
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .subcommand(cmd_status())
        .subcommand(cmd_build())
        .subcommand(cmd_restore())
        .subcommand(cmd_config())
}

fn cmd_status() -> ClapCommand {
    ClapCommand::new("status").about("Show the restore lock and effective settings")
}

fn cmd_build() -> ClapCommand {
    ClapCommand::new("build")
        .about("Run a build command once the restore lock is free")
        .after_help(
            "Examples:\n  \
              buildgate build -- cargo build\n  \
              buildgate build --action rebuild -- cargo build --release\n  \
              buildgate build --action clean -- cargo clean",
        )
        .arg(
            Arg::new("action")
                .long("action")
                .value_name("ACTION")
                .default_value("build")
                .help("Build action: build, rebuild, clean, deploy"),
        )
        .arg(
            Arg::new("scope")
                .long("scope")
                .value_name("SCOPE")
                .default_value("solution")
                .help("Build scope: solution, project, batch"),
        )
        .arg(
            Arg::new("no-restore")
                .long("no-restore")
                .action(ArgAction::SetTrue)
                .help("Do not queue a restore for this build"),
        )
        .arg(
            Arg::new("command")
                .required(true)
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .value_name("COMMAND")
                .help("Build command to run, after `--`"),
        )
}

fn cmd_restore() -> ClapCommand {
    ClapCommand::new("restore")
        .about("Run the restore command under the restore lock")
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Ask the restore command for a full re-resolution"),
        )
}

fn cmd_config() -> ClapCommand {
    ClapCommand::new("config").about("Print the effective configuration as TOML")
}

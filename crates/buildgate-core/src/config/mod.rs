//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/buildgate/config.toml
//! 3. Project config: .buildgate/config.toml
//! 4. Environment variables: BUILDGATE_*
//! 5. CLI flags (command-specific)
//!
//! # Example Config
//!
//! ```toml
//! [lock]
//! kind = "file"
//! dir = ".buildgate/locks"
//!
//! [gate]
//! poll_interval_ms = 250
//! max_wait_ms = 300000
//!
//! [restore]
//! on_build = true
//! command = ["cargo", "fetch"]
//! ```
//!
//! # Module Structure
//!
//! - `types`: configuration structures and the per-file layer
//! - `defaults`: default values
//! - `load`: loading from files and environment
//! - `merge`: applying a layer over a config
//! - `validate`: range checks

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{
    global_config_path, load_config, load_config_from, load_toml_file, project_config_path,
};
pub use types::{
    Config, ConfigLayer, GateConfig, GateLayer, LockConfig, LockKind, LockLayer, RestoreConfig,
    RestoreLayer,
};

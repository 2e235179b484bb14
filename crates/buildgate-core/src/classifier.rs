//! Maps a build-begin event onto what the restore side should do.

use std::fmt;

use strum::{Display, EnumString};

/// What the build covers. Informational only: classification ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BuildScope {
    Solution,
    Project,
    Batch,
    #[strum(default)]
    Other(String),
}

/// The kind of build being started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BuildAction {
    Build,
    /// Full rebuild; forces a restore even if one is memoized
    #[strum(to_string = "rebuild", serialize = "rebuild_all", serialize = "rebuild-all")]
    Rebuild,
    /// Clean; always invalidates memoized resolution state
    Clean,
    Deploy,
    #[strum(default)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildEvent {
    pub scope: BuildScope,
    pub action: BuildAction,
}

impl BuildEvent {
    pub const fn new(scope: BuildScope, action: BuildAction) -> Self {
        Self { scope, action }
    }

    pub const fn solution(action: BuildAction) -> Self {
        Self::new(BuildScope::Solution, action)
    }
}

/// What the restore side should do about a build-begin event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Leave restore alone
    Skip,
    /// Drop any memoized resolution result
    InvalidateCache,
    /// Queue a restore before the build proceeds
    TriggerRestore { force: bool },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::InvalidateCache => write!(f, "invalidate_cache"),
            Self::TriggerRestore { force } => write!(f, "trigger_restore(force={force})"),
        }
    }
}

/// Classify a build-begin event.
///
/// Clean always invalidates, with or without consent. Every other action
/// restores only with consent, and only a rebuild forces it.
pub fn classify(event: &BuildEvent, restore_on_build: bool) -> Decision {
    match event.action {
        BuildAction::Clean => Decision::InvalidateCache,
        _ if !restore_on_build => Decision::Skip,
        BuildAction::Rebuild => Decision::TriggerRestore { force: true },
        _ => Decision::TriggerRestore { force: false },
    }
}

//! Where "restore automatically on build" comes from.
//!
//! The handler asks on every build-begin event; nothing here caches the
//! answer.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Environment variable consulted by [`EnvConsent`].
pub const RESTORE_ON_BUILD_ENV: &str = "BUILDGATE_RESTORE_ON_BUILD";

pub trait ConsentPolicy: Send + Sync {
    /// Whether restore may run automatically when a build starts.
    fn is_automatic(&self) -> bool;
}

impl<C: ConsentPolicy + ?Sized> ConsentPolicy for Arc<C> {
    fn is_automatic(&self) -> bool {
        (**self).is_automatic()
    }
}

/// Consent held in memory, changeable while the host runs.
#[derive(Debug, Default)]
pub struct FixedConsent {
    automatic: AtomicBool,
}

impl FixedConsent {
    pub const fn new(automatic: bool) -> Self {
        Self {
            automatic: AtomicBool::new(automatic),
        }
    }

    pub fn set(&self, automatic: bool) {
        self.automatic.store(automatic, Ordering::Release);
    }
}

impl ConsentPolicy for FixedConsent {
    fn is_automatic(&self) -> bool {
        self.automatic.load(Ordering::Acquire)
    }
}

/// Consent read from `BUILDGATE_RESTORE_ON_BUILD` each time it is asked.
///
/// Unset or unparseable values fall back to `default`; an unparseable value
/// is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvConsent {
    default: bool,
}

impl EnvConsent {
    pub const fn new(default: bool) -> Self {
        Self { default }
    }
}

impl ConsentPolicy for EnvConsent {
    fn is_automatic(&self) -> bool {
        std::env::var(RESTORE_ON_BUILD_ENV).map_or(self.default, |value| {
            parse_flag(&value).unwrap_or_else(|| {
                tracing::warn!(
                    "ignoring {RESTORE_ON_BUILD_ENV}={value:?}, expected true/false"
                );
                self.default
            })
        })
    }
}

/// Parse the boolean spellings accepted in environment overrides.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_parse_flag_spellings() {
        for yes in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_flag(yes), Some(true), "{yes}");
        }
        for no in ["0", "false", "No", "off"] {
            assert_eq!(parse_flag(no), Some(false), "{no}");
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_fixed_consent_can_change() {
        let consent = FixedConsent::new(true);
        assert!(consent.is_automatic());
        consent.set(false);
        assert!(!consent.is_automatic());
    }

    #[test]
    #[serial]
    fn test_env_consent_rereads_variable() {
        let consent = EnvConsent::new(true);

        std::env::remove_var(RESTORE_ON_BUILD_ENV);
        assert!(consent.is_automatic());

        std::env::set_var(RESTORE_ON_BUILD_ENV, "off");
        assert!(!consent.is_automatic());

        std::env::set_var(RESTORE_ON_BUILD_ENV, "on");
        assert!(consent.is_automatic());

        std::env::remove_var(RESTORE_ON_BUILD_ENV);
    }

    #[test]
    #[serial]
    fn test_env_consent_falls_back_on_garbage() {
        let consent = EnvConsent::new(false);

        std::env::set_var(RESTORE_ON_BUILD_ENV, "sometimes");
        assert!(!consent.is_automatic());

        std::env::remove_var(RESTORE_ON_BUILD_ENV);
    }
}

//! Run configuration
//!
//! [`Config`] collects everything the demo driver needs to pick and size a
//! backend. The binary fills it from the command line; library users can build
//! one directly or start from [`Config::default`].
//!
//! Configuration is the only place the crate reports recoverable errors:
//! [`Config::validate`] returns a [`ConfigError`] for values that would make a
//! backend unusable, before anything is allocated.

use crate::memory::value::MAX_FOOTPRINT;
use std::fmt;
use std::str::FromStr;

/// Default values
pub mod defaults {
    /// Bytes per arena block
    pub const BLOCK_CAPACITY: usize = 2048 * 1000;

    /// Numerals in the folding table (`N0` through `N9`)
    pub const NUMERAL_COUNT: usize = 10;

    /// Timed repetitions of the heavy workload
    pub const REPEAT: usize = 1;
}

/// Memory strategy used by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// Bump-allocate, never individually reclaim
    #[default]
    Arena,
    /// Shared ownership, eager reclamation
    Refcounted,
    /// Intrusive counts in a reusable slot pool
    Pooled,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Arena,
        BackendKind::Refcounted,
        BackendKind::Pooled,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Arena => "arena",
            BackendKind::Refcounted => "refcounted",
            BackendKind::Pooled => "pooled",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arena" => Ok(BackendKind::Arena),
            "refcounted" | "rc" => Ok(BackendKind::Refcounted),
            "pooled" | "pool" => Ok(BackendKind::Pooled),
            _ => Err(ConfigError::UnknownBackend {
                name: s.to_string(),
            }),
        }
    }
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Backend name not recognised
    UnknownBackend { name: String },

    /// Arena blocks too small for the largest closure
    BlockTooSmall { capacity: usize, required: usize },

    /// Heavy workload asked to run zero times
    ZeroRepeat,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownBackend { name } => {
                let known: Vec<_> = BackendKind::ALL.iter().map(|k| k.name()).collect();
                write!(
                    f,
                    "Unknown backend '{}' (expected one of: {})",
                    name,
                    known.join(", ")
                )
            }
            ConfigError::BlockTooSmall { capacity, required } => {
                write!(
                    f,
                    "Block capacity of {} bytes is below the {} bytes the largest closure needs",
                    capacity, required
                )
            }
            ConfigError::ZeroRepeat => write!(f, "Repeat count must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    pub block_capacity: usize,
    pub numeral_count: usize,
    pub repeat: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendKind::default(),
            block_capacity: defaults::BLOCK_CAPACITY,
            numeral_count: defaults::NUMERAL_COUNT,
            repeat: defaults::REPEAT,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_capacity < MAX_FOOTPRINT {
            return Err(ConfigError::BlockTooSmall {
                capacity: self.block_capacity,
                required: MAX_FOOTPRINT,
            });
        }
        if self.repeat == 0 {
            return Err(ConfigError::ZeroRepeat);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_names() {
        assert_eq!("arena".parse::<BackendKind>(), Ok(BackendKind::Arena));
        assert_eq!("Refcounted".parse::<BackendKind>(), Ok(BackendKind::Refcounted));
        assert_eq!("rc".parse::<BackendKind>(), Ok(BackendKind::Refcounted));
        assert_eq!(" pooled ".parse::<BackendKind>(), Ok(BackendKind::Pooled));

        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string().parse::<BackendKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_backend_lists_options() {
        let err = "gc".parse::<BackendKind>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownBackend {
                name: "gc".to_string()
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("arena, refcounted, pooled"));
    }

    #[test]
    fn test_validate() {
        assert_eq!(Config::default().validate(), Ok(()));

        let small = Config {
            block_capacity: 16,
            ..Config::default()
        };
        assert_eq!(
            small.validate(),
            Err(ConfigError::BlockTooSmall {
                capacity: 16,
                required: 24
            })
        );

        let idle = Config {
            repeat: 0,
            ..Config::default()
        };
        assert_eq!(idle.validate(), Err(ConfigError::ZeroRepeat));
    }
}

//! Dry-run strategy resolution for mutating commands.
//!
//! Vocabulary: `none`, `client`, `server`. Two legacy forms are still
//! accepted from when the flag was an on/off switch: a flag given with no
//! value resolves to `client`, and bare boolean spellings map `true` to
//! `client` and `false` to `none`. Both legacy forms that change behavior
//! are reported as deprecations; turning that metadata into a warning is
//! the caller's business, not this module's.

use std::fmt;

use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// How a mutating command should treat its writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DryRunStrategy {
    /// Persist the changes.
    #[default]
    None,
    /// Simulate locally and print what would be sent, sending nothing.
    Client,
    /// Submit with a server-side dry-run directive; nothing persists.
    Server,
}

impl DryRunStrategy {
    pub fn is_none(self) -> bool {
        self == Self::None
    }

    pub fn is_client(self) -> bool {
        self == Self::Client
    }

    pub fn is_server(self) -> bool {
        self == Self::Server
    }
}

impl fmt::Display for DryRunStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Client => "client",
            Self::Server => "server",
        })
    }
}

/// Which legacy form produced the resolved strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunDeprecation {
    /// Flag given with no value.
    UnsetValue,
    /// Boolean spelling (`true`, `1`, `T`, ...).
    BooleanValue,
}

impl DryRunDeprecation {
    /// Warning text for the CLI layer to emit verbatim.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnsetValue => {
                "the unset value for --dry-run is deprecated and a value will be required in a future version; must be \"none\", \"server\", or \"client\""
            }
            Self::BooleanValue => {
                "boolean values for --dry-run are deprecated and will be removed in a future version; must be \"none\", \"server\", or \"client\""
            }
        }
    }
}

/// Outcome of resolving a raw dry-run value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryRunResolution {
    pub strategy: DryRunStrategy,
    pub deprecation: Option<DryRunDeprecation>,
}

impl DryRunResolution {
    fn plain(strategy: DryRunStrategy) -> Self {
        Self { strategy, deprecation: None }
    }

    fn deprecated(strategy: DryRunStrategy, deprecation: DryRunDeprecation) -> Self {
        Self { strategy, deprecation: Some(deprecation) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DryRunError {
    #[error("invalid dry-run value ({0}); must be \"none\", \"server\", or \"client\"")]
    InvalidValue(String),
}

// ————————————————————————————————————————————————————————————————————————————
// RESOLUTION
// ————————————————————————————————————————————————————————————————————————————

/// Resolve a raw `--dry-run` value into a strategy.
///
/// `raw = None` means the flag was given with no value (the legacy on/off
/// spelling); a flag that was not given at all is the caller's default and
/// never reaches this function.
pub fn resolve(raw: Option<&str>) -> Result<DryRunResolution, DryRunError> {
    let value = match raw {
        None => {
            return Ok(DryRunResolution::deprecated(
                DryRunStrategy::Client,
                DryRunDeprecation::UnsetValue,
            ));
        }
        Some(value) => value,
    };
    if let Some(enabled) = parse_legacy_bool(value) {
        return Ok(if enabled {
            DryRunResolution::deprecated(DryRunStrategy::Client, DryRunDeprecation::BooleanValue)
        } else {
            // `false` keeps its obvious meaning; no deprecation nag.
            DryRunResolution::plain(DryRunStrategy::None)
        });
    }
    match value {
        "client" => Ok(DryRunResolution::plain(DryRunStrategy::Client)),
        "server" => Ok(DryRunResolution::plain(DryRunStrategy::Server)),
        "none" => Ok(DryRunResolution::plain(DryRunStrategy::None)),
        other => Err(DryRunError::InvalidValue(other.to_owned())),
    }
}

// Exactly the spellings the old boolean flag accepted; nothing looser.
fn parse_legacy_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

// ------------------------------- Tests ------------------------------------ //

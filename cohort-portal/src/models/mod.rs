//! Database models and shared query filters

pub mod unit;
pub mod user;

pub use unit::Unit;
pub use user::{EmailAddress, User, UserError};

use uuid::Uuid;

/// Unit filter accepted by list/recipient queries
///
/// The query string uses the sentinels `all` (no filtering) and
/// `unassigned` (members without a unit) alongside concrete unit ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFilter {
    /// No unit filtering
    Any,

    /// Only users without a unit
    Unassigned,

    /// Only users in the given unit
    Id(Uuid),
}

impl UnitFilter {
    /// Parse a raw query-string value
    ///
    /// `None` and `"all"` mean no filtering; `"unassigned"` selects
    /// unit-less users; anything else must be a valid UUID.
    ///
    /// # Errors
    ///
    /// Returns the offending raw value when it is neither a sentinel
    /// nor a valid UUID.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw {
            None | Some("all") => Ok(Self::Any),
            Some("unassigned") => Ok(Self::Unassigned),
            Some(value) => Uuid::parse_str(value)
                .map(Self::Id)
                .map_err(|_| value.to_string()),
        }
    }
}

/// Parse an approval filter from its raw query-string value
///
/// `None` and `"all"` mean no filtering. Any other value filters on
/// equality with `"true"`, mirroring how the admin client sends the
/// flag.
#[must_use]
pub fn parse_approval(raw: Option<&str>) -> Option<bool> {
    match raw {
        None | Some("all") => None,
        Some(value) => Some(value == "true"),
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Two-part `major.minor` version token.
///
/// Used for the wire protocol and for the shared configuration schema.
/// Compatibility is decided on the major component only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

/// Version advertised by both processes on every exchange.
pub const PROTOCOL_VERSION: Version = Version::new(1, 2);

/// Schema version of the shared `config.toml`.
pub const CONFIG_VERSION: Version = Version::new(1, 1);

impl Version {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Same major component. Minor differences are additive and tolerated.
    pub fn is_compatible_with(self, other: Self) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version token '{0}': expected <major>.<minor>")]
pub struct ParseVersionError(String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError(raw.to_string());
        let (major, minor) = raw.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u16>().map_err(|_| invalid())?;
        let minor = minor.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for Version {
    type Error = ParseVersionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

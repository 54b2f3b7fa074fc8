//! Component version tags.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InstanceError;

/// Version of a component binary, as used for component-store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentVersion {
    /// Daily build.
    Nightly,
    /// A released version, e.g. `v7.5.0`.
    Release(semver::Version),
}

impl FromStr for ComponentVersion {
    type Err = InstanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("nightly") {
            return Ok(Self::Nightly);
        }
        let bare = s.strip_prefix('v').unwrap_or(s);
        semver::Version::parse(bare)
            .map(Self::Release)
            .map_err(|_| InstanceError::InvalidVersion(s.to_string()))
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nightly => f.write_str("nightly"),
            Self::Release(v) => write!(f, "v{v}"),
        }
    }
}

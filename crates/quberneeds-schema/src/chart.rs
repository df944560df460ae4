use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// One entry of a manifest's chart set.
///
/// `name` is the full `repository/chart` identifier as written in the
/// manifest. An empty `version` means "latest".
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChartSpec {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl ChartSpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn latest(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// The chart name with its repository prefix stripped. This is the
    /// directory the chart unpacks into.
    pub fn chart_name(&self) -> Option<&str> {
        self.name.split_once('/').map(|(_, chart)| chart)
    }

    /// `Some(version)` when a version is pinned, `None` for latest.
    pub fn pinned_version(&self) -> Option<&str> {
        if self.version.is_empty() {
            None
        } else {
            Some(&self.version)
        }
    }

    /// A `repository/chart` identifier whose chart part is a plain relative
    /// path, so the unpacked chart stays inside the directory it is fetched
    /// into.
    pub fn is_well_formed(&self) -> bool {
        match self.name.split_once('/') {
            Some((repo, chart)) if !repo.is_empty() && !chart.is_empty() => Path::new(chart)
                .components()
                .all(|c| matches!(c, Component::Normal(_))),
            _ => false,
        }
    }
}

impl fmt::Display for ChartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pinned_version() {
            Some(v) => write!(f, "{}@{v}", self.name),
            None => write!(f, "{}@latest", self.name),
        }
    }
}

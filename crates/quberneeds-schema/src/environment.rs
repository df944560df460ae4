use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered variable-name to value mapping, as declared in a manifest or
/// collected from chart exports.
pub type EnvMap = IndexMap<String, String>;

/// The environment handed to every external toolchain command.
///
/// Mappings are layered on top of each other with [`apply`](Self::apply):
/// a later mapping overwrites keys set by an earlier one, and everything
/// else persists. Commands receive these variables on top of the
/// environment they inherit from the orchestrator process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    vars: EnvMap,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every pair of `mapping` into this environment, replacing
    /// existing values. No filtering or validation of keys and values.
    pub fn apply(&mut self, mapping: &EnvMap) {
        for (key, value) in mapping {
            self.vars.insert(key.clone(), value.clone());
        }
    }

    /// A copy of this environment with `mapping` applied on top.
    #[must_use]
    pub fn layered(&self, mapping: &EnvMap) -> Self {
        let mut next = self.clone();
        next.apply(mapping);
        next
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl From<EnvMap> for Environment {
    fn from(vars: EnvMap) -> Self {
        Self { vars }
    }
}

use crate::chart::ChartSpec;
use crate::environment::EnvMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("manifest is missing the required 'charts' mapping")]
    MissingCharts,
    #[error("manifest declares neither 'env' nor 'envs'")]
    MissingEnv,
    #[error("invalid chart identifier '{0}', expected '<repository>/<name>'")]
    InvalidChartName(String),
}

/// A parsed deployment manifest.
///
/// `charts` keeps the declaration order of the document; every later stage
/// (fetch, export collection, deployment) follows it. `envs` is the
/// normalized environment sequence: a single `env` block becomes a
/// one-element sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub charts: Vec<ChartSpec>,
    pub envs: Vec<EnvMap>,
}

/// Document shape before normalization. Unknown top-level keys are ignored.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    charts: Option<IndexMap<String, Option<String>>>,
    #[serde(default)]
    env: Option<EnvMap>,
    #[serde(default)]
    envs: Option<Vec<EnvMap>>,
}

impl RawManifest {
    fn normalize(self) -> Result<Manifest, ManifestError> {
        let raw_charts = self.charts.ok_or(ManifestError::MissingCharts)?;

        let mut charts = Vec::with_capacity(raw_charts.len());
        for (name, version) in raw_charts {
            let chart = ChartSpec::new(name, version.unwrap_or_default());
            if !chart.is_well_formed() {
                return Err(ManifestError::InvalidChartName(chart.name));
            }
            charts.push(chart);
        }

        let envs = match (self.envs, self.env) {
            (Some(envs), _) => envs,
            (None, Some(env)) => vec![env],
            (None, None) => return Err(ManifestError::MissingEnv),
        };

        Ok(Manifest { charts, envs })
    }
}

impl Manifest {
    pub fn chart_names(&self) -> impl Iterator<Item = &str> {
        self.charts.iter().map(|c| c.name.as_str())
    }
}

/// Parse a JSON manifest document.
pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    let raw: RawManifest = serde_json::from_str(input)?;
    raw.normalize()
}

/// Parse a TOML manifest document with the same shape as the JSON form.
pub fn parse_manifest_toml_str(input: &str) -> Result<Manifest, ManifestError> {
    let raw: RawManifest = toml::from_str(input)?;
    raw.normalize()
}

/// Read and parse a manifest file. Files with a `.toml` extension are read
/// as TOML, anything else as JSON.
pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_manifest_toml_str(&content)
    } else {
        parse_manifest_str(&content)
    }
}

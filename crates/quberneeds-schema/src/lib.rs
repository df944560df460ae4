//! Manifest parsing, chart specs, and environment layering for quberneeds.
//!
//! This crate defines the schema layer: the deployment manifest (`Manifest`)
//! with its ordered chart set and normalized environment sequence, chart
//! identifiers (`ChartSpec`), and the explicit layered `Environment` that is
//! threaded into every external toolchain invocation.

pub mod chart;
pub mod environment;
pub mod manifest;

pub use chart::ChartSpec;
pub use environment::{EnvMap, Environment};
pub use manifest::{
    parse_manifest_file, parse_manifest_str, parse_manifest_toml_str, Manifest, ManifestError,
};

use crate::resolver::ResolvedBundle;
use crate::CoreError;
use quberneeds_schema::EnvMap;
use std::path::Path;
use tracing::debug;

/// Directory inside a chart root whose files publish environment variables.
pub const EXPORTS_DIR: &str = "exports";

const JOIN_SEPARATOR: &str = ",";

/// Variable name for an export file: the file name without its last
/// extension, upper-cased. `db.url.txt` becomes `DB.URL`.
pub fn export_var_name(file_name: &Path) -> Option<String> {
    let stem = file_name.file_stem()?.to_string_lossy();
    Some(stem.to_uppercase())
}

/// Gather exports from every bundle in resolution order.
///
/// Each regular file directly under `<root>/exports` contributes one
/// variable whose value is the file's content, unmodified. When several
/// bundles export the same name the values are joined with `,` in bundle
/// order. Subdirectories are not descended into.
pub fn collect_exports(bundles: &[ResolvedBundle]) -> Result<EnvMap, CoreError> {
    let mut collected = EnvMap::new();
    for bundle in bundles {
        collect_from_dir(&bundle.exports_dir(), &mut collected)?;
    }
    Ok(collected)
}

fn collect_from_dir(dir: &Path, collected: &mut EnvMap) -> Result<(), CoreError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    for path in files {
        let Some(name) = path.file_name().and_then(|n| export_var_name(Path::new(n))) else {
            continue;
        };
        let value = std::fs::read_to_string(&path)?;
        debug!("export {name} from {}", path.display());
        merge(collected, name, value);
    }
    Ok(())
}

fn merge(collected: &mut EnvMap, name: String, value: String) {
    match collected.get_mut(&name) {
        Some(existing) => {
            existing.push_str(JOIN_SEPARATOR);
            existing.push_str(&value);
        }
        None => {
            collected.insert(name, value);
        }
    }
}

use crate::resolver::ResolvedBundle;
use crate::CoreError;
use tracing::debug;

/// Remove the working directory of every bundle. A directory that is
/// already gone is not an error.
pub fn cleanup(bundles: &[ResolvedBundle]) -> Result<(), CoreError> {
    for bundle in bundles {
        match std::fs::remove_dir_all(&bundle.workdir) {
            Ok(()) => debug!("removed {}", bundle.workdir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

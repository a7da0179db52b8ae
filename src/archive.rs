//! Theme and icon archive extraction.
use crate::configs::error::{ConfigError, Result};
use std::fs::{self, File};
use std::path::Path;
use std::process::Command;
use tar::Archive;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractOutcome {
    Extracted,
    /// The archive does not exist; callers warn and carry on.
    Missing,
}

/// Unpacks an archive into a target directory.
pub trait Extractor {
    fn extract(&self, archive: &Path, target: &Path) -> Result<ExtractOutcome>;
}

/// Unpacks plain `.tar` files in-process and hands compressed tarballs to the system `tar`,
/// which knows every compression the themes ship with.
#[derive(Default)]
pub struct TarExtractor;

impl TarExtractor {
    fn unpack_plain(archive: &Path, target: &Path) -> Result<()> {
        let mut archive = Archive::new(File::open(archive)?);
        archive.set_preserve_permissions(true);
        archive.unpack(target)?;

        Ok(())
    }

    fn unpack_external(archive: &Path, target: &Path) -> Result<()> {
        let status = Command::new("tar")
            .arg("-xf")
            .arg(archive)
            .arg("-C")
            .arg(target)
            .status()
            .map_err(|err| ConfigError::command("tar", err))?;

        if status.success() {
            Ok(())
        } else {
            Err(ConfigError::command(
                "tar",
                format!("could not extract {} ({})", archive.display(), status),
            ))
        }
    }
}

impl Extractor for TarExtractor {
    fn extract(&self, archive: &Path, target: &Path) -> Result<ExtractOutcome> {
        if !archive.is_file() {
            return Ok(ExtractOutcome::Missing);
        }

        fs::create_dir_all(target)?;

        if archive.extension().map_or(false, |ext| ext == "tar") {
            debug!(archive = %archive.display(), "unpacking plain tar");
            TarExtractor::unpack_plain(archive, target)?;
        } else {
            debug!(archive = %archive.display(), "unpacking with system tar");
            TarExtractor::unpack_external(archive, target)?;
        }

        Ok(ExtractOutcome::Extracted)
    }
}

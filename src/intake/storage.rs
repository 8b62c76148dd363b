//! Blob store for uploaded applicant documents.
//!
//! Files live one directory per applicant below the blob root:
//! ```text
//! {root}/
//! ├── AB123456/
//! │   ├── passport_1718000000000.pdf
//! │   └── passport_1718000000001.pdf
//! └── XY987654/
//!     └── photo_1718000000002.jpg
//! ```
//!
//! Uploads are first written to a holding directory and then renamed into
//! place, so a file under the root is always complete.

use std::fs;
use std::io::{self, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use super::ApplicantId;
use crate::{PortalError, Result};

/// Outcome of moving a staged upload into the blob store.
#[derive(Debug)]
pub enum Placement {
    /// The file now lives at the given path.
    Placed(PathBuf),
    /// The target name is taken; the staged file is handed back untouched.
    Occupied(NamedTempFile),
}

/// Filesystem blob store keyed by applicant identifier.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    holding: PathBuf,
}

impl BlobStore {
    /// Open a blob store, creating the root and holding directories.
    pub fn new(root: impl Into<PathBuf>, holding: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let holding = holding.into();
        if root == holding {
            return Err(PortalError::Config(
                "holding directory must differ from the blob root".to_string(),
            ));
        }
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&holding)?;

        Ok(Self { root, holding })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Holding directory for uploads in flight.
    pub fn holding_path(&self) -> &Path {
        &self.holding
    }

    /// Create an empty temporary file in the holding directory.
    ///
    /// The file is deleted when dropped unless it is placed first.
    pub fn stage(&self) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.holding)
    }

    /// Directory holding one applicant's files.
    pub fn applicant_dir(&self, id: &ApplicantId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Move a staged file to `{root}/{id}/{file_name}`.
    ///
    /// The applicant directory is created if needed. An existing file is
    /// never overwritten.
    pub fn place(
        &self,
        staged: NamedTempFile,
        id: &ApplicantId,
        file_name: &str,
    ) -> io::Result<Placement> {
        if !is_plain_file_name(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "stored file name must be a single path segment",
            ));
        }

        let dir = self.applicant_dir(id);
        fs::create_dir_all(&dir)?;
        let target = dir.join(file_name);

        match staged.persist_noclobber(&target) {
            Ok(_) => Ok(Placement::Placed(target)),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(Placement::Occupied(e.file))
            }
            Err(e) if e.error.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(
                    target = %target.display(),
                    "Holding area is on another filesystem, copying into place"
                );
                Self::copy_into_place(e.file, &dir, &target)
            }
            Err(e) => Err(e.error),
        }
    }

    /// Copy a staged file into a temporary inside `dir`, then rename it.
    fn copy_into_place(
        mut staged: NamedTempFile,
        dir: &Path,
        target: &Path,
    ) -> io::Result<Placement> {
        let mut local = tempfile::Builder::new()
            .prefix(".incoming-")
            .tempfile_in(dir)?;
        staged.as_file_mut().seek(SeekFrom::Start(0))?;
        io::copy(staged.as_file_mut(), local.as_file_mut())?;
        local.as_file().sync_all()?;

        match local.persist_noclobber(target) {
            Ok(_) => Ok(Placement::Placed(target.to_path_buf())),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(Placement::Occupied(staged))
            }
            Err(e) => Err(e.error),
        }
    }

    /// Resolve a stored file from its applicant directory and file name.
    ///
    /// Returns `None` if either part is not a valid single segment or the
    /// file does not exist.
    pub fn resolve(&self, applicant_dir: &str, file_name: &str) -> Option<PathBuf> {
        let id = ApplicantId::parse_sanitized(applicant_dir)?;
        if !is_plain_file_name(file_name) {
            return None;
        }
        let path = self.applicant_dir(&id).join(file_name);
        path.is_file().then_some(path)
    }

    /// Read a stored file.
    #[cfg(test)]
    pub fn load(&self, applicant_dir: &str, file_name: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(applicant_dir, file_name)
            .ok_or_else(|| PortalError::NotFound(format!("File: {applicant_dir}/{file_name}")))?;
        Ok(fs::read(path)?)
    }

    /// List the stored file names for an applicant, sorted.
    #[cfg(test)]
    pub fn list(&self, id: &ApplicantId) -> Result<Vec<String>> {
        let dir = self.applicant_dir(id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with(".incoming-"))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Whether `name` is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

//! `archive_repo`: packs an explicit file list into a tarball or zip.
//!
//! The original builds the archive in-process from `archival.tarit`/
//! `archival.zipit`, writing each `(path, mode, is_link, content)` tuple
//! directly into the archive stream. There is no archive-writing crate in
//! the workspace's dependency stack, so this stages the same file list on
//! disk and shells out to `tar`/`zip`, the same "native executable via
//! `SubprocIO`" pattern used for `svnadmin`/`svnrdump` elsewhere in the
//! gateway.

use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;

use vcsgate_core::{ErrorKind, VcsError, VcsResult};
use vcsgate_subprocio::{SpawnParams, SubprocIo};

pub enum ArchiveKind {
    TarGz,
    TarBz2,
    Zip,
}

impl ArchiveKind {
    pub fn parse(kind: &str) -> VcsResult<Self> {
        match kind {
            "tgz" => Ok(Self::TarGz),
            "tbz2" => Ok(Self::TarBz2),
            "zip" => Ok(Self::Zip),
            other => Err(VcsError::new(
                ErrorKind::Archive,
                format!("Remote does not support: {other:?}."),
            )),
        }
    }
}

pub struct ArchiveFile {
    pub path: String,
    pub mode: u32,
    pub is_link: bool,
    pub content: Vec<u8>,
}

pub async fn archive_repo(archive_path: &Path, kind: &str, files: &[ArchiveFile]) -> VcsResult<()> {
    let kind = ArchiveKind::parse(kind)?;

    let staging = archive_path.with_extension("staging");
    std::fs::create_dir_all(&staging).map_err(io_err)?;

    for file in files {
        let dest = staging.join(&file.path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        if file.is_link {
            let target = String::from_utf8_lossy(&file.content).into_owned();
            let _ = std::fs::remove_file(&dest);
            symlink(target, &dest).map_err(io_err)?;
        } else {
            std::fs::write(&dest, &file.content).map_err(io_err)?;
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(file.mode)).map_err(io_err)?;
        }
    }

    let result = run_packer(&kind, archive_path, &staging).await;
    let _ = std::fs::remove_dir_all(&staging);
    result
}

async fn run_packer(kind: &ArchiveKind, archive_path: &Path, staging: &Path) -> VcsResult<()> {
    let archive_str = archive_path.to_string_lossy().into_owned();
    let argv = match kind {
        ArchiveKind::TarGz => vec!["tar".to_string(), "czf".to_string(), archive_str, "-C".to_string(), staging_str(staging), ".".to_string()],
        ArchiveKind::TarBz2 => vec!["tar".to_string(), "cjf".to_string(), archive_str, "-C".to_string(), staging_str(staging), ".".to_string()],
        ArchiveKind::Zip => vec!["zip".to_string(), "-r".to_string(), archive_str, ".".to_string()],
    };

    let mut params = SpawnParams::new(argv).fail_on_stderr(false);
    if matches!(kind, ArchiveKind::Zip) {
        params = params.cwd(staging);
    }

    let subproc = SubprocIo::spawn(params).map_err(|e| {
        let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
        err.log();
        err
    })?;
    subproc.wait_collect().await.map_err(|e| {
        let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
        err.log();
        err
    })?;
    Ok(())
}

fn staging_str(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

fn io_err(e: std::io::Error) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}

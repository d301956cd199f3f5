//! The small slice of the Git adapter that shells out to the `git`
//! executable rather than going through `git2`: `update-server-info` has no
//! libgit2 equivalent, and `run_git_command`/`discover_git_version` are
//! explicitly process-based in the original (`vcsserver/git.py`'s
//! `run_git_command`, which spawns `settings.GIT_EXECUTABLE` directly).

use std::path::Path;

use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};
use vcsgate_subprocio::{SpawnParams, SubprocError, SubprocIo};

fn translate_spawn(e: std::io::Error) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}

fn translate_run(e: SubprocError) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}

/// Mirrors `run_git_command`'s environment hygiene: force
/// `GIT_CONFIG_NOGLOBAL=1` and prepend `-c core.quotepath=false` unless the
/// caller asked for a bare invocation. The original additionally strips any
/// inherited `GIT_DIR`; the gateway process never sets one, so there is
/// nothing to remove here.
pub async fn run_git_command(
    git_path: &str,
    wire: Option<&Wire>,
    cmd: &[String],
    bare: bool,
) -> VcsResult<(Vec<u8>, Vec<u8>)> {
    let mut argv = vec![git_path.to_string()];
    if !bare {
        argv.push("-c".to_string());
        argv.push("core.quotepath=false".to_string());
    }
    argv.extend(cmd.iter().cloned());

    let mut params = SpawnParams::new(argv)
        .env("GIT_CONFIG_NOGLOBAL", "1")
        .fail_on_return_code(false)
        .fail_on_stderr(false);

    if let Some(wire) = wire {
        if wire.path.is_dir() {
            params = params.cwd(&wire.path);
        }
    }

    let subproc = SubprocIo::spawn(params).map_err(translate_spawn)?;
    let out = subproc.wait_collect().await.map_err(translate_run)?;
    Ok((out, Vec::new()))
}

pub async fn discover_git_version(git_path: &str) -> VcsResult<String> {
    let (out, _) = run_git_command(git_path, None, &["--version".to_string()], true).await?;
    Ok(String::from_utf8_lossy(&out).trim().to_string())
}

pub async fn update_server_info(git_path: &str, repo_path: &Path) -> VcsResult<()> {
    let argv = vec![git_path.to_string(), "update-server-info".to_string()];
    let params = SpawnParams::new(argv).cwd(repo_path).fail_on_stderr(false);
    let subproc = SubprocIo::spawn(params).map_err(translate_spawn)?;
    subproc.wait_collect().await.map_err(translate_run)?;
    Ok(())
}

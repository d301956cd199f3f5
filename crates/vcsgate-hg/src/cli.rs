//! Shells out to the `hg` executable. Every adapter method in this crate
//! bottoms out in [`HgCli::run`]; there is no library binding, so the
//! per-wire `config` entries that the original applies via
//! `make_ui_from_config`/`baseui.setconfig` are instead passed as repeated
//! `--config section.option=value` arguments, and the hook-config filter
//! that `_create_config(config, hooks=False)` applies is reproduced by
//! simply omitting the four hook keys before building the argument list.

use std::path::Path;

use vcsgate_core::{ConfigEntry, ErrorKind, VcsError, VcsResult};
use vcsgate_subprocio::{SpawnParams, SubprocError, SubprocIo};

const HOOKS_TO_CLEAN: &[(&str, &str)] = &[
    ("hooks", "changegroup.repo_size"),
    ("hooks", "preoutgoing.pre_pull"),
    ("hooks", "outgoing.pull_logger"),
    ("hooks", "prechangegroup.pre_push"),
];

#[derive(Clone)]
pub struct HgCli {
    pub hg_path: String,
}

impl HgCli {
    pub fn new(hg_path: impl Into<String>) -> Self {
        Self {
            hg_path: hg_path.into(),
        }
    }

    fn config_args(config: &[ConfigEntry], hooks: bool) -> Vec<String> {
        let mut args = Vec::new();
        for (section, option, value) in config {
            if !hooks && HOOKS_TO_CLEAN.contains(&(section.as_str(), option.as_str())) {
                continue;
            }
            args.push("--config".to_string());
            args.push(format!("{section}.{option}={value}"));
        }
        args
    }

    /// Runs `hg <args>` in `cwd`, with `config` applied and hooks included
    /// or stripped per `hooks`. `ui.quiet=true` and `worker.numcpus=1` are
    /// forced, matching `make_ui_from_config`'s unconditional settings.
    pub async fn run(
        &self,
        cwd: Option<&Path>,
        args: &[String],
        config: &[ConfigEntry],
        hooks: bool,
    ) -> VcsResult<Vec<u8>> {
        let mut argv = vec![self.hg_path.clone()];
        argv.push("--config".to_string());
        argv.push("ui.quiet=true".to_string());
        argv.push("--config".to_string());
        argv.push("worker.numcpus=1".to_string());
        argv.extend(Self::config_args(config, hooks));
        argv.extend(args.iter().cloned());

        let mut params = SpawnParams::new(argv)
            .env("HGPLAIN", "1")
            .fail_on_return_code(true)
            .fail_on_stderr(false);
        if let Some(cwd) = cwd {
            params = params.cwd(cwd);
        }

        let subproc = SubprocIo::spawn(params).map_err(translate_spawn)?;
        subproc.wait_collect().await.map_err(translate_run)
    }

    pub async fn init(&self, path: &Path) -> VcsResult<()> {
        let argv = vec![self.hg_path.clone(), "init".to_string(), path.to_string_lossy().into_owned()];
        let params = SpawnParams::new(argv).fail_on_stderr(false);
        let subproc = SubprocIo::spawn(params).map_err(translate_spawn)?;
        subproc.wait_collect().await.map_err(translate_run)?;
        Ok(())
    }
}

fn translate_spawn(e: std::io::Error) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}

fn translate_run(e: SubprocError) -> VcsError {
    let kind = match &e {
        SubprocError::NonZeroExit(_) => ErrorKind::Abort,
        SubprocError::Stderr(_) => ErrorKind::Error,
        SubprocError::Io(_) => ErrorKind::Error,
    };
    let err = VcsError::with_source(kind, e.to_string(), e);
    err.log();
    err
}

pub fn to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

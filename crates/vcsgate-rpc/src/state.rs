//! Rocket-managed state: one repo factory per enabled backend, built once
//! at startup from [`crate::config::GatewayConfig`] and shared through
//! `rocket.manage(...)`, the same shape as the teacher's `ConfigManager`
//! fairing in `upsilon`'s `lib.rs`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vcsgate_context_cache::CacheSizing;
use vcsgate_git::GitFactory;
use vcsgate_hg::{HgCli, HgFactory};
use vcsgate_hooks::transport::{EmbeddedHooks, EmbeddedHooksRegistry, HookOutcome};
use vcsgate_hooks::HookName;
use vcsgate_svn::{SvnCli, SvnFactory};

use crate::config::{GatewayConfig, HgSection, SvnSection};

/// A permissive embedded hook module used whenever a call carries no
/// `hooks_uri`/`hooks_module` of its own, allowing every operation through
/// without a round trip. Registered under the name `"default"`.
struct AllowAllHooks;

impl EmbeddedHooks for AllowAllHooks {
    fn invoke(&self, _name: HookName, _extras: &vcsgate_core::Extras) -> std::io::Result<HookOutcome> {
        Ok(HookOutcome::Ok {
            status: 0,
            output: Vec::new(),
        })
    }
}

pub struct AppState {
    pub git: GitFactory,
    pub git_path: String,
    pub git_repo_root: PathBuf,
    pub git_update_server_info: bool,

    pub hg: Option<HgFactory>,
    pub hg_repo_root: Option<PathBuf>,

    pub svn: Option<SvnFactory>,
    pub svn_repo_root: Option<PathBuf>,

    pub embedded_hooks: EmbeddedHooksRegistry,
    pub use_echo_app: bool,

    shutdown: AtomicBool,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let sizing = CacheSizing {
            max_capacity: config.cache.max_capacity,
            ttl: std::time::Duration::from_secs(config.cache.ttl_secs),
        };

        let git = GitFactory::new(sizing);

        let (hg, hg_repo_root) = match &config.hg {
            HgSection::Enabled(hg) => {
                let cli = HgCli::new(hg.path.clone());
                (Some(HgFactory::new(sizing, cli)), Some(hg.repo_root.clone()))
            }
            HgSection::Disabled => {
                log::info!("Mercurial backend disabled");
                (None, None)
            }
        };

        let (svn, svn_repo_root) = match &config.svn {
            SvnSection::Enabled(svn) => {
                let cli = SvnCli {
                    svnadmin_path: svn.svnadmin_path.clone(),
                    svnlook_path: svn.svnlook_path.clone(),
                    svn_path: svn.svn_path.clone(),
                    svnrdump_path: svn.svnrdump_path.clone(),
                    svnmucc_path: svn.svnmucc_path.clone(),
                };
                (Some(SvnFactory::new(sizing, cli)), Some(svn.repo_root.clone()))
            }
            SvnSection::Disabled => {
                log::info!("Subversion backend disabled");
                (None, None)
            }
        };

        let mut embedded_hooks = EmbeddedHooksRegistry::new();
        embedded_hooks.register("default", Arc::new(AllowAllHooks));

        Self {
            git,
            git_path: config.git.path.clone(),
            git_repo_root: config.git.repo_root.clone(),
            git_update_server_info: config.git.update_server_info,
            hg,
            hg_repo_root,
            svn,
            svn_repo_root,
            embedded_hooks,
            use_echo_app: config.dev.use_echo_app,
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

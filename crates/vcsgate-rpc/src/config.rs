//! `vcsgate.yaml` shape: one enable-gated section per backend, plus cache
//! sizing and hook transport defaults. The enable-gate pattern (a `bool`
//! plus a flattened config payload, folded into a two-variant enum by a
//! manual `Deserialize`) follows the teacher's `GitProtocol`/`GitDaemon`
//! convention in `upsilon-vcs::config`.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

fn default_git_path() -> String {
    "git".to_string()
}

fn default_update_server_info() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_git_path")]
    pub path: String,
    #[serde(rename = "repo-root")]
    pub repo_root: PathBuf,
    #[serde(rename = "update-server-info", default = "default_update_server_info")]
    pub update_server_info: bool,
}

#[derive(Debug, Clone)]
pub enum HgSection {
    Enabled(HgConfig),
    Disabled,
}

impl<'de> Deserialize<'de> for HgSection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Desc {
            enable: bool,
            #[serde(flatten, default)]
            config: Option<HgConfig>,
        }

        match Desc::deserialize(deserializer)? {
            Desc { enable: true, config: Some(config) } => Ok(HgSection::Enabled(config)),
            Desc { enable: true, config: None } => {
                Err(serde::de::Error::custom("hg.enable is true but hg.path/repo-root are missing"))
            }
            Desc { enable: false, .. } => Ok(HgSection::Disabled),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HgConfig {
    pub path: String,
    #[serde(rename = "repo-root")]
    pub repo_root: PathBuf,
}

#[derive(Debug, Clone)]
pub enum SvnSection {
    Enabled(SvnConfig),
    Disabled,
}

impl<'de> Deserialize<'de> for SvnSection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Desc {
            enable: bool,
            #[serde(flatten, default)]
            config: Option<SvnConfig>,
        }

        match Desc::deserialize(deserializer)? {
            Desc { enable: true, config: Some(config) } => Ok(SvnSection::Enabled(config)),
            Desc { enable: true, config: None } => {
                Err(serde::de::Error::custom("svn.enable is true but svn config is incomplete"))
            }
            Desc { enable: false, .. } => Ok(SvnSection::Disabled),
        }
    }
}

fn default_svnadmin_path() -> String {
    "svnadmin".to_string()
}

fn default_svnlook_path() -> String {
    "svnlook".to_string()
}

fn default_svn_path() -> String {
    "svn".to_string()
}

fn default_svnrdump_path() -> String {
    "svnrdump".to_string()
}

fn default_svnmucc_path() -> String {
    "svnmucc".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SvnConfig {
    #[serde(rename = "svnadmin-path", default = "default_svnadmin_path")]
    pub svnadmin_path: String,
    #[serde(rename = "svnlook-path", default = "default_svnlook_path")]
    pub svnlook_path: String,
    #[serde(rename = "svn-path", default = "default_svn_path")]
    pub svn_path: String,
    #[serde(rename = "svnrdump-path", default = "default_svnrdump_path")]
    pub svnrdump_path: String,
    #[serde(rename = "svnmucc-path", default = "default_svnmucc_path")]
    pub svnmucc_path: String,
    #[serde(rename = "repo-root")]
    pub repo_root: PathBuf,
}

fn default_max_capacity() -> u64 {
    100
}

fn default_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "max-capacity", default = "default_max_capacity")]
    pub max_capacity: u64,
    #[serde(rename = "ttl-secs", default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_hooks_transport() -> String {
    "embedded".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HooksConfig {
    #[serde(default = "default_hooks_transport")]
    pub transport: String,
    pub uri: Option<String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            transport: default_hooks_transport(),
            uri: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevConfig {
    #[serde(rename = "use-echo-app", default)]
    pub use_echo_app: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub git: GitConfig,
    #[serde(default = "disabled_hg")]
    pub hg: HgSection,
    #[serde(default = "disabled_svn")]
    pub svn: SvnSection,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub dev: DevConfig,
}

fn disabled_hg() -> HgSection {
    HgSection::Disabled
}

fn disabled_svn() -> SvnSection {
    SvnSection::Disabled
}

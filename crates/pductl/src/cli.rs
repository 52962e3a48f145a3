//! Clap derive structures for the `pductl` CLI.
//!
//! Defines the command tree, global flags, and the `Section.Key[=Value]`
//! argument types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pductl -- fetch, edit, and push APC PDU configuration files
#[derive(Debug, Parser)]
#[command(
    name = "pductl",
    version,
    about = "Manage APC power-distribution unit configuration over FTP",
    long_about = "Downloads a PDU's config.ini, caches it locally, and pushes edited\n\
        copies back. The device applies an uploaded file on its own schedule,\n\
        typically within a few minutes; avoid pushing again in that window.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile name or IPv4 address
    #[arg(long, short = 'd', env = "PDUCTL_DEVICE", global = true)]
    pub device: Option<String>,

    /// Login name (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Login password (overrides profile and environment)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Directory holding cached and pending configuration files
    #[arg(long, env = "PDUCTL_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "ini", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// The device's own INI-like format
    Ini,
    /// Pretty-printed JSON, sections as objects
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the device configuration and refresh the local cache
    Fetch,

    /// Print the cached configuration without contacting the device
    Show(ShowArgs),

    /// Print one setting from the cached configuration
    Get(GetArgs),

    /// Fetch, change settings, and push the result to the device
    Set(SetArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Show the last file sent for upload instead of the last fetch
    #[arg(long)]
    pub pending: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Setting to read, e.g. `SystemID.Contact`
    pub setting: SettingPath,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// One or more `Section.Key=Value` assignments
    #[arg(required = true, num_args = 1..)]
    pub assignments: Vec<Assignment>,
}

// ── Setting paths ────────────────────────────────────────────────────

/// `Section.Key`, split at the last dot so section names may contain dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingPath {
    pub section: String,
    pub key: String,
}

impl FromStr for SettingPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (section, key) = s
            .rsplit_once('.')
            .ok_or_else(|| format!("expected Section.Key, got '{s}'"))?;
        if section.is_empty() || key.is_empty() {
            return Err(format!("expected Section.Key, got '{s}'"));
        }
        Ok(Self {
            section: section.into(),
            key: key.into(),
        })
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)
    }
}

/// `Section.Key=Value`. The value may be empty and may contain `=` or dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub path: SettingPath,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected Section.Key=Value, got '{s}'"))?;
        if value.contains(['\n', '\r']) {
            return Err("values cannot span lines".into());
        }
        let path: SettingPath = path.parse()?;
        pductl_core::codec::check_setting(&path.section, &path.key, value)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            path,
            value: value.into(),
        })
    }
}

//! Command-line interface definitions.
//!
//! The fleet form `gpufleet <indices> <action> [service]` is captured as an
//! external subcommand and parsed a second time by [`FleetArgs`], so the
//! index list can sit where a subcommand name would.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Run GPU compute/worker service pairs, one isolated instance per device
#[derive(Parser, Debug)]
#[command(name = "gpufleet")]
#[command(version)]
#[command(after_help = "Fleet actions:\n  gpufleet <indices> <up|down|restart|logs|stop> [compute|worker|both]\n\n\
Example:\n  gpufleet 0,1 up\n  gpufleet 2 logs worker")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_SETTINGS_FILE: &str = "gpufleet.toml";

impl Cli {
    /// Parse the fleet form, if that is the command, and fold any global
    /// flags written after the fleet words into [`Cli::global`].
    pub fn take_fleet(&mut self) -> Result<Option<FleetArgs>, clap::Error> {
        let Commands::Fleet(words) = &self.command else {
            return Ok(None);
        };
        let mut fleet = FleetArgs::parse_words(words)?;
        self.global.merge(std::mem::take(&mut fleet.global));
        Ok(Some(fleet))
    }
}

/// Flags accepted anywhere on the command line.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Env file holding per-device keys [default: .env]
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Fleet settings file [default: gpufleet.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

impl GlobalArgs {
    /// Combine with flags parsed later on the same line. Switches are
    /// or-ed, counts add up, and later values win.
    pub fn merge(&mut self, later: GlobalArgs) {
        if later.color != ColorChoice::Auto {
            self.color = later.color;
        }
        self.json |= later.json;
        self.quiet |= later.quiet;
        self.verbose = self.verbose.saturating_add(later.verbose);
        if later.env_file.is_some() {
            self.env_file = later.env_file;
        }
        if later.settings.is_some() {
            self.settings = later.settings;
        }
    }

    /// Env file path and whether it must exist. Only an explicit path is
    /// required.
    #[must_use]
    pub fn env_file(&self) -> (PathBuf, bool) {
        match &self.env_file {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_ENV_FILE), false),
        }
    }

    /// Settings path and whether it must exist.
    #[must_use]
    pub fn settings_file(&self) -> (PathBuf, bool) {
        match &self.settings {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        }
    }
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull the images referenced by the compose file
    Pull,

    /// Run the one-time host setup command
    Setup,

    /// Resolve and validate per-device configuration without running anything
    Check(CheckArgs),

    /// `<indices> <action> [service]`
    #[command(external_subcommand)]
    Fleet(Vec<OsString>),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Comma-separated device indices (e.g. `0,1,3`)
    pub indices: String,
}

/// Positional form of a fleet action.
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "gpufleet", no_binary_name = true)]
#[command(override_usage = "gpufleet <INDICES> <ACTION> [SERVICE]")]
pub struct FleetArgs {
    /// Comma-separated device indices (e.g. `0,1,3`)
    pub indices: String,

    /// One of up, down, restart, logs, stop
    pub action: String,

    /// compute, worker or both (default both)
    pub service: Option<String>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

impl FleetArgs {
    /// Parse the words captured by [`Commands::Fleet`].
    pub fn parse_words(words: &[OsString]) -> Result<Self, clap::Error> {
        Self::try_parse_from(words)
    }
}

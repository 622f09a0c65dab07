//! CLI entry point and handlers.

pub mod check;
pub mod command;
pub mod diagnostic;
pub mod fleet;
pub mod output;
pub mod pull;
pub mod setup;

use std::process::ExitCode;

use tracing::debug;

use self::command::{Cli, Commands, FleetArgs};
use self::diagnostic::{EnvironmentError, InvocationError};
use self::output::OutputConfig;
use crate::application::{Plan, Report};
use crate::domain::{ActionRequest, DeviceIndex};
use crate::error::{ConfigError, DispatchError};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Settings;

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Every targeted device succeeded.
    Success,
    /// At least one device failed; the rest were still attempted.
    InstanceFailure,
    /// The invocation was malformed; nothing ran.
    Usage,
    /// Settings, env file, or host tooling could not be used.
    Environment,
}

impl Exit {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::InstanceFailure => 1,
            Exit::Usage => 2,
            Exit::Environment => 3,
        }
    }

    /// Print a clap error and map it: help and version are not failures.
    #[must_use]
    pub fn from_clap(err: &clap::Error) -> Self {
        let _ = err.print();
        if err.use_stderr() {
            Exit::Usage
        } else {
            Exit::Success
        }
    }

    #[must_use]
    pub fn from_report(report: &Report) -> Self {
        if report.is_success() {
            Exit::Success
        } else {
            Exit::InstanceFailure
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Run a parsed command line to completion.
pub async fn run(mut cli: Cli) -> Exit {
    // Flags after the fleet words must be known before any output.
    let fleet = match cli.take_fleet() {
        Ok(fleet) => fleet,
        Err(err) => return Exit::from_clap(&err),
    };
    let global = &cli.global;
    output::configure(
        OutputConfig::new(global.json, global.quiet),
        global.color,
    );

    let (settings_path, required) = global.settings_file();
    let settings = match Settings::load(&settings_path, required) {
        Ok(settings) => settings,
        Err(err) => {
            diagnostic::report(
                EnvironmentError::new(err.to_string())
                    .with_help("check the file passed with --settings"),
            );
            return Exit::Environment;
        }
    };
    settings.init_logging(global.verbose);
    debug!(settings = %settings_path.display(), "settings loaded");

    match &cli.command {
        Commands::Pull => pull::execute(&settings).await,
        Commands::Setup => setup::execute(&settings).await,
        Commands::Check(args) => {
            let indices = DeviceIndex::parse_list(&args.indices);
            if indices.is_empty() {
                return invocation(&DispatchError::NoIndices);
            }
            match load_source(&cli) {
                Ok(source) => check::execute(&settings, source, &indices),
                Err(exit) => exit,
            }
        }
        Commands::Fleet(_) => {
            let Some(args) = fleet else {
                return Exit::Usage;
            };
            let request = request_from(args);
            if let Err(err) = Plan::from_request(&request) {
                return invocation(&err);
            }
            match load_source(&cli) {
                Ok(source) => {
                    let dispatcher = bootstrap::build_dispatcher(&settings, source);
                    fleet::execute(&dispatcher, &request).await
                }
                Err(exit) => exit,
            }
        }
    }
}

fn request_from(args: FleetArgs) -> ActionRequest {
    let request = ActionRequest::new(args.action, DeviceIndex::parse_list(&args.indices));
    match args.service {
        Some(service) => request.with_service(service),
        None => request,
    }
}

fn load_source(cli: &Cli) -> Result<crate::adapter::outbound::LayeredSource, Exit> {
    let (path, required) = cli.global.env_file();
    bootstrap::build_source(&path, required).map_err(|err| {
        let help = match err {
            ConfigError::Parse { .. } => "env files use KEY=value lines",
            _ => "pass an existing file with --env-file",
        };
        diagnostic::report(EnvironmentError::new(err.to_string()).with_help(help));
        Exit::Environment
    })
}

pub(crate) fn invocation(err: &DispatchError) -> Exit {
    diagnostic::report(InvocationError::from(err));
    Exit::Usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::inbound::cli::command::GlobalArgs;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            Exit::Success.code(),
            Exit::InstanceFailure.code(),
            Exit::Usage.code(),
            Exit::Environment.code(),
        ];
        assert_eq!(codes, [0, 1, 2, 3]);
    }

    #[test]
    fn fleet_words_become_a_request() {
        let request = request_from(FleetArgs {
            indices: "0,,2".into(),
            action: "restart".into(),
            service: Some("worker".into()),
            global: GlobalArgs::default(),
        });
        assert_eq!(request.action, "restart");
        assert_eq!(request.service.as_deref(), Some("worker"));
        let indices: Vec<_> = request.indices.iter().map(DeviceIndex::as_str).collect();
        assert_eq!(indices, ["0", "2"]);
    }
}

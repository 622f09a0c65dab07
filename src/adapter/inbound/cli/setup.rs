//! `gpufleet setup`.

use super::diagnostic::{self, EnvironmentError};
use super::{output, Exit};
use crate::error::Error;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Settings;

pub async fn execute(settings: &Settings) -> Exit {
    let runner = bootstrap::build_setup(settings);
    output::section("Setup");
    output::field("command", runner.argv().join(" "));

    match runner.run().await {
        Ok(()) => {
            output::success("Setup completed");
            Exit::Success
        }
        Err(err) => {
            let help = match err {
                Error::Io(_) => "check that the setup program is installed and on PATH",
                _ => "the command is configured under [setup] in the settings file",
            };
            diagnostic::report(EnvironmentError::new(err.to_string()).with_help(help));
            Exit::Environment
        }
    }
}

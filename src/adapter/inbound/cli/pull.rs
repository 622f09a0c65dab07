//! `gpufleet pull`.

use super::diagnostic::{self, EnvironmentError};
use super::{output, Exit};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Settings;
use crate::port::RuntimeAdapter;

pub async fn execute(settings: &Settings) -> Exit {
    let runtime = bootstrap::build_runtime(settings);
    let pb = output::spinner("Pulling images");
    match runtime.pull().await {
        Ok(()) => {
            output::spinner_success(&pb, "Images pulled");
            Exit::Success
        }
        Err(err) => {
            output::spinner_fail(&pb, "Pull failed");
            diagnostic::report(EnvironmentError::new(err.to_string()).with_help(format!(
                "check that `{} compose` works and {} exists",
                settings.runtime_program,
                settings.compose_file.display()
            )));
            Exit::Environment
        }
    }
}

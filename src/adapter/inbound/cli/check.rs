//! `gpufleet check <indices>`: resolve configuration without touching the runtime.

use super::{output, Exit};
use crate::adapter::outbound::LayeredSource;
use crate::application::{aggregate, DiagnosticLine};
use crate::domain::{ActionResult, DeviceIndex};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Settings;

pub fn execute(settings: &Settings, source: LayeredSource, indices: &[DeviceIndex]) -> Exit {
    let dispatcher = bootstrap::build_dispatcher(settings, source);
    output::section("Configuration");

    let mut results = Vec::with_capacity(indices.len());
    for (index, resolved) in dispatcher.check(indices) {
        let result = match resolved {
            Ok((namespace, config)) => {
                let result = ActionResult::success(index, namespace);
                output::result_line(&DiagnosticLine::from(&result));
                output::field("device", &config.device_binding);
                output::field("port", config.service_port);
                output::field("address", &config.account_address);
                if !config.workload_names.is_empty() {
                    output::field("workloads", config.workload_names.join(", "));
                }
                result
            }
            Err(err) => {
                let result = ActionResult::failure(index, None, err);
                output::result_line(&DiagnosticLine::from(&result));
                result
            }
        };
        results.push(result);
    }

    let report = aggregate(&results);
    output::summary("check", &report);
    Exit::from_report(&report)
}

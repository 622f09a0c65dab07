//! `gpufleet <indices> <action> [service]`.

use indicatif::ProgressBar;
use tracing::debug;

use super::{invocation, output, Exit};
use crate::application::{aggregate, DiagnosticLine, DispatchObserver, InterruptHandle, Interrupts};
use crate::domain::{Action, ActionRequest, ActionResult, DeviceIndex};
use crate::infrastructure::bootstrap::FleetDispatcher;

/// Renders dispatch progress on the terminal.
#[derive(Default)]
struct ConsoleObserver {
    spinner: Option<ProgressBar>,
}

impl DispatchObserver for ConsoleObserver {
    fn started(&mut self, index: &DeviceIndex, action: Action) {
        if action.is_streaming() {
            output::section(&format!("Logs for device {index}"));
            output::note("press Ctrl-C to move on to the next device");
        } else {
            self.spinner = Some(output::spinner(&format!("{action} device {index}")));
        }
    }

    fn finished(&mut self, result: &ActionResult) {
        if let Some(pb) = self.spinner.take() {
            output::spinner_clear(&pb);
        }
        output::result_line(&DiagnosticLine::from(result));
    }

    fn log_line(&mut self, index: &DeviceIndex, line: &str) {
        output::log_line(index, line);
    }
}

/// Forward every Ctrl-C as one interrupt until the receiver goes away.
fn forward_ctrl_c(handle: InterruptHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            if !handle.interrupt() {
                break;
            }
        }
    })
}

pub async fn execute(dispatcher: &FleetDispatcher, request: &ActionRequest) -> Exit {
    let streaming = request
        .action
        .parse::<Action>()
        .is_ok_and(Action::is_streaming);

    // Only log tailing takes over SIGINT; other actions keep the default.
    let (mut interrupts, forwarder) = if streaming {
        let (handle, interrupts) = Interrupts::channel();
        (interrupts, Some(forward_ctrl_c(handle)))
    } else {
        (Interrupts::none(), None)
    };

    let mut observer = ConsoleObserver::default();
    let outcome = dispatcher
        .dispatch(request, &mut observer, &mut interrupts)
        .await;
    if let Some(forwarder) = forwarder {
        forwarder.abort();
    }

    match outcome {
        Ok(results) => {
            let report = aggregate(&results);
            output::summary(&request.action, &report);
            Exit::from_report(&report)
        }
        Err(err) => invocation(&err),
    }
}

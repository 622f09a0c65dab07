//! Docker Compose runtime adapter.
//!
//! Every instance is a compose project named after its namespace, so
//! containers, networks and volumes of two instances never overlap. The
//! compose file is shared; per-instance values reach it only through the
//! environment of the spawned `docker compose` process.

use std::path::PathBuf;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::{InstanceConfig, Namespace, TargetService};
use crate::error::RuntimeError;
use crate::infrastructure::config::service::ServicesConfig;
use crate::port::{LogStream, RuntimeAdapter};

/// Runs instance groups as compose projects.
#[derive(Debug, Clone)]
pub struct ComposeRuntime {
    program: String,
    compose_file: PathBuf,
    services: ServicesConfig,
}

impl ComposeRuntime {
    pub fn new(compose_file: impl Into<PathBuf>, services: ServicesConfig) -> Self {
        Self {
            program: "docker".into(),
            compose_file: compose_file.into(),
            services,
        }
    }

    /// Use a different container CLI (e.g. `podman`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Full argument list for `docker compose`, starting after the program.
    #[must_use]
    pub fn compose_args(
        &self,
        namespace: Option<&Namespace>,
        subcommand: &[&str],
        target: Option<TargetService>,
    ) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        if let Some(namespace) = namespace {
            args.push("-p".into());
            args.push(namespace.as_str().into());
        }
        args.push("-f".into());
        args.push(self.compose_file.display().to_string());
        args.extend(subcommand.iter().map(|s| (*s).to_string()));
        if let Some(target) = target {
            args.extend(self.service_names(target));
        }
        args
    }

    /// Compose service names for `target`. `Both` names every role
    /// explicitly so that unrelated services in the file are left alone.
    fn service_names(&self, target: TargetService) -> Vec<String> {
        target
            .roles()
            .iter()
            .map(|role| self.services.name(*role).to_string())
            .collect()
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn output(&self, mut cmd: Command, args: &[String]) -> Result<Output, RuntimeError> {
        debug!(program = %self.program, ?args, "running compose");
        cmd.output()
            .await
            .map_err(|e| RuntimeError::Other(format!("failed to run {}: {e}", self.program)))
    }

    async fn run(&self, args: Vec<String>) -> Result<Output, RuntimeError> {
        let cmd = self.command(&args);
        self.output(cmd, &args).await
    }

    /// Container IDs of the targeted services. Without `all`, only running
    /// containers are listed.
    async fn containers(
        &self,
        namespace: &Namespace,
        target: TargetService,
        all: bool,
    ) -> Result<Vec<String>, RuntimeError> {
        let subcommand: &[&str] = if all { &["ps", "-a", "-q"] } else { &["ps", "-q"] };
        let output = self
            .run(self.compose_args(Some(namespace), subcommand, Some(target)))
            .await?;
        if !output.status.success() {
            return Err(RuntimeError::Other(stderr_of(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect())
    }

    async fn require_existing(
        &self,
        namespace: &Namespace,
        target: TargetService,
        running: bool,
    ) -> Result<(), RuntimeError> {
        if self.containers(namespace, target, !running).await?.is_empty() {
            return Err(RuntimeError::NotFound(namespace.to_string()));
        }
        Ok(())
    }

    async fn checked(
        &self,
        namespace: &Namespace,
        subcommand: &[&str],
        target: Option<TargetService>,
    ) -> Result<(), RuntimeError> {
        let output = self
            .run(self.compose_args(Some(namespace), subcommand, target))
            .await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RuntimeError::Other(stderr_of(&output)))
        }
    }
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("compose exited with {}", output.status)
    } else {
        stderr
    }
}

#[async_trait]
impl RuntimeAdapter for ComposeRuntime {
    async fn start(
        &self,
        namespace: &Namespace,
        config: &InstanceConfig,
        target: TargetService,
    ) -> Result<(), RuntimeError> {
        if !self.containers(namespace, target, false).await?.is_empty() {
            return Err(RuntimeError::AlreadyRunning(namespace.to_string()));
        }

        let args = self.compose_args(Some(namespace), &["up", "-d"], Some(target));
        let mut cmd = self.command(&args);
        cmd.envs(config.env_bindings());
        let output = self.output(cmd, &args).await?;
        if !output.status.success() {
            return Err(RuntimeError::CreateFailed(stderr_of(&output)));
        }

        info!(namespace = %namespace, target = %target, port = config.service_port, "instance started");
        Ok(())
    }

    async fn stop(&self, namespace: &Namespace, target: TargetService) -> Result<(), RuntimeError> {
        self.require_existing(namespace, target, true).await?;
        self.checked(namespace, &["stop"], Some(target)).await?;
        info!(namespace = %namespace, target = %target, "instance stopped");
        Ok(())
    }

    async fn destroy(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<(), RuntimeError> {
        self.require_existing(namespace, target, false).await?;
        match target {
            TargetService::Both => self.checked(namespace, &["down"], None).await?,
            _ => {
                self.checked(namespace, &["rm", "-s", "-f"], Some(target))
                    .await?
            }
        }
        info!(namespace = %namespace, target = %target, "instance removed");
        Ok(())
    }

    async fn restart(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<(), RuntimeError> {
        self.require_existing(namespace, target, false).await?;
        self.checked(namespace, &["restart"], Some(target)).await?;
        info!(namespace = %namespace, target = %target, "instance restarted");
        Ok(())
    }

    async fn stream_logs(
        &self,
        namespace: &Namespace,
        target: TargetService,
    ) -> Result<LogStream, RuntimeError> {
        self.require_existing(namespace, target, false).await?;

        let args = self.compose_args(Some(namespace), &["logs", "-f", "--tail", "100"], Some(target));
        let mut cmd = self.command(&args);
        cmd.stderr(Stdio::null());
        // Ctrl-C at the terminal must reach only the dispatcher, which ends
        // the tail itself; the child is killed when the stream drops.
        #[cfg(unix)]
        cmd.process_group(0);
        let mut child = cmd
            .spawn()
            .map_err(|e| RuntimeError::Other(format!("failed to run {}: {e}", self.program)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Other("log process has no stdout".into()))?;
        let lines = BufReader::new(stdout).lines();

        // The child travels with the stream so dropping the stream kills it.
        let lines = stream::unfold(Some((lines, child)), |state| async move {
            let (mut lines, child) = state?;
            match lines.next_line().await {
                Ok(Some(line)) => Some((Ok(line), Some((lines, child)))),
                Ok(None) => None,
                Err(e) => Some((Err(RuntimeError::Other(e.to_string())), None)),
            }
        });
        Ok(lines.boxed())
    }

    async fn pull(&self) -> Result<(), RuntimeError> {
        let output = self
            .run(self.compose_args(None, &["pull"], Some(TargetService::Both)))
            .await?;
        if !output.status.success() {
            return Err(RuntimeError::Other(stderr_of(&output)));
        }
        info!("images pulled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceIndex, DEFAULT_PREFIX};

    fn runtime() -> ComposeRuntime {
        ComposeRuntime::new("docker-compose.yml", ServicesConfig::default())
    }

    fn namespace(raw: &str) -> Namespace {
        Namespace::derive(DEFAULT_PREFIX, &DeviceIndex::new(raw).expect("index"))
    }

    fn config() -> InstanceConfig {
        InstanceConfig {
            device_binding: "0".into(),
            service_port: 8188,
            account_address: "0x0000000000000000000000000000000000000000".into(),
            workload_names: Vec::new(),
        }
    }

    #[test]
    fn project_scoped_args_name_both_services() {
        let args = runtime().compose_args(
            Some(&namespace("2")),
            &["up", "-d"],
            Some(TargetService::Both),
        );
        assert_eq!(
            args,
            vec![
                "compose",
                "-p",
                "instance-2",
                "-f",
                "docker-compose.yml",
                "up",
                "-d",
                "comfyui",
                "miner"
            ]
        );
    }

    #[test]
    fn single_role_targets_one_service() {
        let args = runtime().compose_args(
            Some(&namespace("0")),
            &["stop"],
            Some(TargetService::Worker),
        );
        assert_eq!(args.last().map(String::as_str), Some("miner"));
        assert!(!args.contains(&"comfyui".to_string()));
    }

    #[test]
    fn pull_is_not_project_scoped() {
        let args = runtime().compose_args(None, &["pull"], Some(TargetService::Both));
        assert!(!args.contains(&"-p".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_listing_means_not_found() {
        // `true` prints nothing and succeeds: every ps query is empty.
        let runtime = runtime().with_program("true");
        assert_eq!(
            runtime.stop(&namespace("1"), TargetService::Both).await,
            Err(RuntimeError::NotFound("instance-1".into()))
        );
        assert!(matches!(
            runtime.stream_logs(&namespace("1"), TargetService::Both).await,
            Err(RuntimeError::NotFound(_))
        ));
        assert!(runtime
            .start(&namespace("1"), &config(), TargetService::Both)
            .await
            .is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_cli_is_reported_not_retried() {
        let runtime = runtime().with_program("false");
        assert!(matches!(
            runtime.restart(&namespace("1"), TargetService::Both).await,
            Err(RuntimeError::Other(_))
        ));
        assert!(matches!(runtime.pull().await, Err(RuntimeError::Other(_))));
    }

    /// Process group ID, field 5 of `/proc/<pid>/stat`.
    #[cfg(target_os = "linux")]
    fn pgrp(stat: &str) -> String {
        let after_comm = &stat[stat.rfind(')').expect("comm") + 1..];
        after_comm.split_whitespace().nth(2).expect("pgrp").to_string()
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn log_tail_runs_outside_the_terminal_process_group() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let program = dir.path().join("fake-docker");
        std::fs::write(
            &program,
            "#!/bin/sh\n\
             for arg in \"$@\"; do\n\
             case \"$arg\" in\n\
             ps) echo c0ffee; exit 0 ;;\n\
             logs) cat /proc/$$/stat; exit 0 ;;\n\
             esac\n\
             done\n",
        )
        .expect("write script");
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");

        let runtime = runtime().with_program(program.display().to_string());
        let mut lines = runtime
            .stream_logs(&namespace("0"), TargetService::Both)
            .await
            .expect("stream opens");
        let child_stat = lines.next().await.expect("one line").expect("readable");
        let own_stat = std::fs::read_to_string("/proc/self/stat").expect("own stat");

        assert_ne!(pgrp(&child_stat), pgrp(&own_stat));
    }

    #[tokio::test]
    async fn missing_program_is_other_error() {
        let runtime = runtime().with_program("gpufleet-no-such-binary");
        assert!(matches!(
            runtime.stop(&namespace("0"), TargetService::Both).await,
            Err(RuntimeError::Other(_))
        ));
    }
}

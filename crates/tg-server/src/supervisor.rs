//! ngrok process supervisor
//!
//! Drives one run through
//! `Unconfigured -> ConfigChecked -> TunnelConfigLoaded -> TunnelsValidated
//! -> DaemonStarted -> Polling -> TunnelsReady | Failed`.
//!
//! Config and binary problems surface before anything is spawned. Once ngrok
//! is running only [`Supervisor::shutdown`] or [`Supervisor::terminate`]
//! stop it; a control API that is not listening yet is retried until the
//! configured deadline.

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Instant};

use tg_core::config::ServerConfig;
use tg_protocol::PublishedTunnelSet;

use crate::error::SupervisorError;
use crate::ngrok::{config_args, load_tunnel_definitions, ApiTunnel, TunnelApi, TunnelDefinitions};

/// How long ngrok gets to exit after an interrupt before it is killed
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Supervisor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconfigured,
    ConfigChecked,
    TunnelConfigLoaded,
    TunnelsValidated,
    DaemonStarted,
    Polling,
    TunnelsReady,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Unconfigured => "unconfigured",
            Phase::ConfigChecked => "config-checked",
            Phase::TunnelConfigLoaded => "tunnel-config-loaded",
            Phase::TunnelsValidated => "tunnels-validated",
            Phase::DaemonStarted => "daemon-started",
            Phase::Polling => "polling",
            Phase::TunnelsReady => "tunnels-ready",
            Phase::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Owns the ngrok subprocess for one server run
pub struct Supervisor {
    config: ServerConfig,
    tunnels: Vec<String>,
    definitions: TunnelDefinitions,
    phase: Phase,
    child: Option<Child>,
}

impl Supervisor {
    /// `tunnels` overrides the configured tunnel list when non-empty
    pub fn new(config: ServerConfig, tunnels: Vec<String>) -> Self {
        let tunnels = if tunnels.is_empty() {
            config.tunnels.clone()
        } else {
            tunnels
        };

        Self {
            config,
            tunnels,
            definitions: TunnelDefinitions::new(),
            phase: Phase::Unconfigured,
            child: None,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Tunnels this run will start
    pub fn tunnels(&self) -> &[String] {
        &self.tunnels
    }

    /// OS process id of ngrok while it is running
    pub fn daemon_pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    fn transition(&mut self, phase: Phase) {
        tracing::debug!("Supervisor {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn fail<T>(&mut self, err: SupervisorError) -> Result<T, SupervisorError> {
        self.transition(Phase::Failed);
        Err(err)
    }

    /// Run `ngrok config check` against the configured files
    pub async fn check_daemon_binary(&mut self) -> Result<(), SupervisorError> {
        let output = Command::new(&self.config.ngrok_command)
            .args(["config", "check"])
            .args(config_args(&self.config.ngrok_config))
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Err(source) => self.fail(SupervisorError::NgrokNotFound {
                command: self.config.ngrok_command.clone(),
                source,
            }),
            Ok(output) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stdout = String::from_utf8_lossy(&output.stdout);
                let detail = if stderr.trim().is_empty() { stdout } else { stderr };
                self.fail(SupervisorError::NgrokBadConfig(detail.trim().to_string()))
            }
            Ok(_) => {
                self.transition(Phase::ConfigChecked);
                Ok(())
            }
        }
    }

    /// Merge the `tunnels` sections of every ngrok config file
    pub fn load_daemon_tunnel_config(&mut self) -> Result<(), SupervisorError> {
        match load_tunnel_definitions(&self.config.ngrok_config) {
            Ok(definitions) => {
                tracing::info!("ngrok defines {} tunnel(s)", definitions.len());
                self.definitions = definitions;
                self.transition(Phase::TunnelConfigLoaded);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Every requested tunnel must be defined in the ngrok config
    pub fn validate_requested_tunnels(&mut self) -> Result<(), SupervisorError> {
        if self.tunnels.is_empty() {
            return self.fail(SupervisorError::TunnelsNotSpecified);
        }

        if let Some(unknown) = self
            .tunnels
            .iter()
            .find(|name| !self.definitions.contains_key(name.as_str()))
            .cloned()
        {
            return self.fail(SupervisorError::UnknownTunnel(unknown));
        }

        self.transition(Phase::TunnelsValidated);
        Ok(())
    }

    /// All pre-spawn checks, in order
    pub async fn prepare(&mut self) -> Result<(), SupervisorError> {
        self.check_daemon_binary().await?;
        self.load_daemon_tunnel_config()?;
        self.validate_requested_tunnels()
    }

    /// Spawn `ngrok start <tunnels...>` without waiting for it to be ready
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        let spawned = Command::new(&self.config.ngrok_command)
            .arg("start")
            .args(&self.tunnels)
            .args(config_args(&self.config.ngrok_config))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                tracing::info!(
                    "Started ngrok (pid {:?}) with tunnels: {}",
                    child.id(),
                    self.tunnels.join(", ")
                );
                self.child = Some(child);
                self.transition(Phase::DaemonStarted);
                Ok(())
            }
            Err(e) => self.fail(SupervisorError::Spawn(e)),
        }
    }

    /// Poll the control API until it lists every requested tunnel
    pub async fn poll_until_ready<A>(&mut self, api: &A) -> Result<PublishedTunnelSet, SupervisorError>
    where
        A: TunnelApi + ?Sized,
    {
        let expected = self.tunnels.len();
        let interval = self.config.poll_interval;
        let deadline = self.config.ready_timeout;

        self.transition(Phase::Polling);

        let Some(child) = self.child.as_mut() else {
            return self.fail(SupervisorError::NotStarted);
        };

        let result = tokio::select! {
            listed = wait_for_tunnels(api, expected, interval, deadline) => listed,
            status = child.wait() => Err(match status {
                Ok(status) => SupervisorError::DaemonExited(status.to_string()),
                Err(e) => SupervisorError::Wait(e),
            }),
        };

        match result.and_then(|tunnels| Ok(ApiTunnel::into_set(&tunnels)?)) {
            Ok(set) => {
                tracing::info!("ngrok reports all {} tunnel(s)", set.len());
                self.transition(Phase::TunnelsReady);
                Ok(set)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Ask ngrok to shut down gracefully
    pub fn terminate(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };

        if let Ok(Some(_)) = child.try_wait() {
            return;
        }

        tracing::info!("Sending interrupt to ngrok (pid {:?})", child.id());
        send_interrupt(child);
    }

    /// Wait for ngrok to exit
    pub async fn wait(&mut self) -> Result<ExitStatus, SupervisorError> {
        let child = self.child.as_mut().ok_or(SupervisorError::NotStarted)?;
        child.wait().await.map_err(SupervisorError::Wait)
    }

    /// Interrupt ngrok and wait for it, killing it if it lingers
    pub async fn shutdown(&mut self) -> Option<ExitStatus> {
        self.terminate();
        let child = self.child.as_mut()?;

        match timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!("ngrok exited: {}", status);
                Some(status)
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to wait for ngrok: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("ngrok did not exit within {:?}, killing it", SHUTDOWN_GRACE);
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill ngrok: {}", e);
                }
                child.try_wait().ok().flatten()
            }
        }
    }
}

#[cfg(unix)]
fn send_interrupt(child: &mut Child) {
    let Some(pid) = child.id() else {
        return;
    };

    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        tracing::warn!("Failed to send SIGINT to ngrok (pid {}): {}", pid, err);
    }
}

#[cfg(not(unix))]
fn send_interrupt(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        tracing::warn!("Failed to stop ngrok: {}", e);
    }
}

/// Poll `api` until it lists exactly `expected` tunnels.
///
/// "Not listening yet" is retried every `interval`; any other API error is
/// returned immediately. `limit` bounds the whole wait, including a request
/// that never gets an answer, and expiry is `DaemonReadyTimeout`.
pub async fn wait_for_tunnels<A>(
    api: &A,
    expected: usize,
    interval: Duration,
    limit: Duration,
) -> Result<Vec<ApiTunnel>, SupervisorError>
where
    A: TunnelApi + ?Sized,
{
    let started = Instant::now();
    let mut reported = 0usize;

    let polled = timeout(
        limit,
        poll_tunnels(api, expected, interval, started, limit, &mut reported),
    )
    .await;

    match polled {
        Ok(result) => result,
        Err(_) => Err(SupervisorError::DaemonReadyTimeout {
            waited: started.elapsed(),
            reported,
            expected,
        }),
    }
}

async fn poll_tunnels<A>(
    api: &A,
    expected: usize,
    interval: Duration,
    started: Instant,
    limit: Duration,
    reported: &mut usize,
) -> Result<Vec<ApiTunnel>, SupervisorError>
where
    A: TunnelApi + ?Sized,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match api.list_tunnels().await {
            Ok(tunnels) if tunnels.len() == expected => {
                tracing::debug!("Tunnels ready after {} attempt(s)", attempts);
                return Ok(tunnels);
            }
            Ok(tunnels) => {
                *reported = tunnels.len();
                tracing::debug!("ngrok reports {}/{} tunnels", reported, expected);
            }
            Err(e) if e.is_transient() => {
                tracing::debug!("Attempt {}: {}", attempts, e);
            }
            Err(e) => return Err(e.into()),
        }

        if started.elapsed() + interval > limit {
            return Err(SupervisorError::DaemonReadyTimeout {
                waited: started.elapsed(),
                reported: *reported,
                expected,
            });
        }

        sleep(interval).await;
    }
}

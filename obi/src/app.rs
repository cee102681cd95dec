use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use obi_ipc::{Command, Response, StateInfo, WindowInfo};

use crate::core::{Config, State};
use crate::ipc::IpcServer;
use crate::notify::Notifier;
use crate::platform::{WindowManipulator, WindowSystem};

type IpcCommandWithResponse = (Command, mpsc::Sender<Response>);

/// Work a command defers out of the handler; performed by the loop after
/// the response has been sent.
#[derive(Debug, Clone, PartialEq)]
enum Followup {
    None,
    Quit,
    /// Forceful fallback to a close request. May block or fail, so it runs
    /// on a background task with errors swallowed to a log line.
    TerminateProcess {
        pid: u32,
    },
}

pub struct App {}

impl App {
    pub fn run(config: Config) -> Result<()> {
        #[cfg(target_os = "windows")]
        {
            // Mirror of the control port check a second instance would lose
            // anyway; failing early gives a clear message instead of a bind
            // error buried in the server task.
            if std::net::TcpStream::connect(crate::ipc::CONTROL_ADDR).is_ok() {
                anyhow::bail!("Another obi instance is already running");
            }

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(Self::run_loop(
                config,
                crate::win32::Win32WindowSystem,
                crate::win32::Win32WindowManipulator,
                crate::notify::TraceNotifier,
            ))
        }
        #[cfg(not(target_os = "windows"))]
        {
            let _ = config;
            anyhow::bail!("The obi daemon drives the native window list and only runs on Windows")
        }
    }

    /// The single polling context: one task owns the tracked state, the
    /// tick interval, and IPC command handling. Ticks never overlap; a tick
    /// that runs long simply swallows the missed ones.
    pub async fn run_loop<W, M, N>(config: Config, ws: W, wm: M, mut notifier: N) -> Result<()>
    where
        W: WindowSystem,
        M: WindowManipulator + Clone + Send + 'static,
        N: Notifier,
    {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<IpcCommandWithResponse>(256);

        let server = IpcServer::new(cmd_tx);
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                tracing::error!("Control server error: {}", e);
            }
        });

        let mut state = State::new(config);
        let mut interval = time::interval(Duration::from_millis(state.config.poll_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Polling loop started (every {} ms)",
            state.config.poll_interval_ms
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    state.tick(&ws, &wm, &mut notifier);
                }
                Some((cmd, resp_tx)) = cmd_rx.recv() => {
                    let (response, followup) = handle_command(&mut state, &wm, &cmd);
                    let _ = resp_tx.send(response).await;
                    match followup {
                        Followup::None => {}
                        Followup::Quit => break,
                        Followup::TerminateProcess { pid } => {
                            let wm = wm.clone();
                            tokio::task::spawn_blocking(move || {
                                if let Err(e) = wm.terminate_process(pid) {
                                    tracing::warn!("Failed to terminate process {}: {}", pid, e);
                                }
                            });
                        }
                    }
                }
            }
        }

        tracing::info!("Polling loop stopped");
        Ok(())
    }
}

fn handle_command<M: WindowManipulator>(
    state: &mut State,
    wm: &M,
    cmd: &Command,
) -> (Response, Followup) {
    match cmd {
        Command::SetSide { side } => {
            tracing::info!("Taskbar side set to {:?}", side);
            state.config.side = *side;
            (Response::Ok, Followup::None)
        }
        Command::Activate { handle } => match state.find(*handle) {
            Some(entity) => {
                entity.activate(wm);
                (Response::Ok, Followup::None)
            }
            None => (unknown_window(*handle), Followup::None),
        },
        Command::CloseWindow { handle } => match state.find(*handle) {
            Some(entity) => {
                entity.close(wm);
                (Response::Ok, Followup::None)
            }
            None => (unknown_window(*handle), Followup::None),
        },
        Command::KillWindow { handle } => match state.find(*handle) {
            Some(entity) => {
                tracing::info!(
                    "Terminating process {} for [{}] {}",
                    entity.pid,
                    entity.root,
                    entity.title
                );
                (Response::Ok, Followup::TerminateProcess { pid: entity.pid })
            }
            None => (unknown_window(*handle), Followup::None),
        },
        Command::LaunchNew { handle } => match state.find(*handle) {
            Some(entity) => match entity.icon.path() {
                Some(path) => match std::process::Command::new(path).spawn() {
                    Ok(child) => {
                        tracing::info!(
                            "Launched new instance of {} (pid {})",
                            path.display(),
                            child.id()
                        );
                        (Response::Ok, Followup::None)
                    }
                    Err(e) => (
                        Response::Error {
                            message: format!("Failed to launch {}: {}", path.display(), e),
                        },
                        Followup::None,
                    ),
                },
                None => (
                    Response::Error {
                        message: "No executable path captured for this window".to_string(),
                    },
                    Followup::None,
                ),
            },
            None => (unknown_window(*handle), Followup::None),
        },
        Command::ListWindows => {
            let windows: Vec<WindowInfo> = state
                .entities
                .iter()
                .map(|e| WindowInfo {
                    handle: e.root,
                    title: e.title.clone(),
                    active: e.active,
                    child_count: e.children.len(),
                    exe_path: e.icon.path().map(|p| p.display().to_string()),
                })
                .collect();
            (Response::Windows { windows }, Followup::None)
        }
        Command::GetState => {
            let state_info = StateInfo {
                side: state.config.side,
                taskbar_width: state.config.taskbar_width,
                window_count: state.entities.len(),
                foreground: state.entities.iter().find(|e| e.active).map(|e| e.root),
            };
            (
                Response::State { state: state_info },
                Followup::None,
            )
        }
        Command::Quit => (Response::Ok, Followup::Quit),
    }
}

fn unknown_window(handle: u64) -> Response {
    Response::Error {
        message: format!("No tracked window with handle {}", handle),
    }
}

//! Administrative command console.
//!
//! Reads one command per line from stdin while the server runs:
//! `pause`, `resume`, `shutdown` (or `stop`), `status`, `version`.
//! The task ends on shutdown or end of input.
//!
//! Stdin is read on a detached OS thread, never on the runtime's blocking
//! pool, so a pending read does not hold up runtime shutdown.

use std::io::BufRead;
use std::str::FromStr;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::controller::Server;
use crate::lifecycle::shutdown::ShutdownListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Pause,
    Resume,
    ShutDown,
    Status,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for ConsoleCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "shutdown" | "stop" => Ok(Self::ShutDown),
            "status" => Ok(Self::Status),
            "version" => Ok(Self::Version),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

const LINE_BUFFER: usize = 16;

/// Spawn the console reading from stdin.
pub fn spawn_console(server: Server, shutdown: ShutdownListener) -> JoinHandle<()> {
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let reader = std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), tx));
    if let Err(e) = reader {
        tracing::warn!(error = %e, "Failed to spawn console reader");
    }

    tokio::spawn(run_console(server, rx, shutdown))
}

/// Forward lines from `input` until end of input or the console goes away.
/// Blocks the calling thread.
fn forward_lines<R: BufRead>(input: R, tx: mpsc::Sender<String>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Console input failed");
                break;
            }
        };
        if tx.blocking_send(line).is_err() {
            break;
        }
    }
}

/// Process command lines until shutdown or end of input.
pub async fn run_console(
    server: Server,
    mut lines: mpsc::Receiver<String>,
    mut shutdown: ShutdownListener,
) {
    tracing::info!("Command console ready");

    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = shutdown.cancelled() => break,
        };

        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::ShutDown) => {
                if let Err(e) = server.shut_down().await {
                    tracing::error!(error = %e, "Shutdown finished with error");
                }
                break;
            }
            Ok(command) => execute(&server, command).await,
            Err(e) => tracing::warn!("{}", e),
        }
    }

    tracing::debug!("Command console stopped");
}

async fn execute(server: &Server, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Pause => server.pause().await,
        ConsoleCommand::Resume => server.resume().await,
        ConsoleCommand::Status => {
            let state = server.state().await;
            tracing::info!(state = %state, "Server status");
        }
        ConsoleCommand::Version => {
            tracing::info!(version = crate::VERSION, "Server version");
        }
        ConsoleCommand::ShutDown => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutdown::ShutdownSignal;
    use crate::lifecycle::state::ServerState;
    use std::time::Duration;

    #[test]
    fn parses_commands() {
        assert_eq!("pause".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Pause));
        assert_eq!(" Resume \n".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Resume));
        assert_eq!("stop".parse::<ConsoleCommand>(), Ok(ConsoleCommand::ShutDown));
        assert_eq!("SHUTDOWN".parse::<ConsoleCommand>(), Ok(ConsoleCommand::ShutDown));
        assert_eq!("status".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Status));
        assert_eq!("version".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Version));
        assert_eq!(
            "reboot".parse::<ConsoleCommand>(),
            Err(UnknownCommand("reboot".to_string()))
        );
    }

    #[tokio::test]
    async fn ends_at_end_of_input() {
        let server = Server::builder().build();
        let signal = ShutdownSignal::new();
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let reader = std::thread::spawn(move || {
            let input: &[u8] = b"status\nbogus\n\npause\n";
            forward_lines(input, tx);
        });

        tokio::time::timeout(
            Duration::from_secs(1),
            run_console(server.clone(), rx, signal.subscribe()),
        )
        .await
        .expect("console did not finish");

        reader.join().unwrap();
        assert_eq!(server.state().await, ServerState::Stopped);
    }

    #[tokio::test]
    async fn ends_on_shutdown_signal_with_input_open() {
        let server = Server::builder().build();
        let signal = ShutdownSignal::new();
        let (_tx, rx) = mpsc::channel(LINE_BUFFER);

        let console = tokio::spawn(run_console(server, rx, signal.subscribe()));
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), console)
            .await
            .expect("console ignored shutdown")
            .unwrap();
    }

    #[test]
    fn reader_stops_once_console_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let input: &[u8] = b"status\nstatus\nstatus\n";
        forward_lines(input, tx);
    }
}

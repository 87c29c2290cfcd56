//! Symbolizer subprocess lifecycle and pipe protocol
//!
//! One [`SymbolizerProcess`] owns one child for its whole life. Queries are
//! strictly request/response over stdin/stdout; any I/O failure marks the
//! process unusable permanently. There is deliberately no respawn: a child
//! that desynced once cannot be trusted to line up with later queries.

use crate::domain::{Pid, SymbolizeError};
use crate::symbolize::env;
use log::{debug, warn};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// How to launch the external symbolizer tool.
#[derive(Debug, Clone)]
pub struct SymbolizerConfig {
    /// Tool to spawn. Defaults to `atos`, resolved via `PATH`.
    pub tool: PathBuf,
    /// Target process handed to the tool via `-p`.
    pub pid: Pid,
    /// Pass `-d` so the tool keeps offsets in its output.
    pub verbose_backtraces: bool,
}

impl SymbolizerConfig {
    #[must_use]
    pub fn new(pid: Pid) -> Self {
        Self { tool: PathBuf::from("atos"), pid, verbose_backtraces: true }
    }

    #[must_use]
    pub fn with_tool(mut self, tool: PathBuf) -> Self {
        self.tool = tool;
        self
    }
}

/// A running symbolizer subprocess with its pipe endpoints.
pub struct SymbolizerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// Raw response line, reused across queries.
    buffer: String,
    failed: bool,
}

impl SymbolizerProcess {
    /// Spawn the configured tool with stdin/stdout pipes.
    ///
    /// The task-port environment entry is rewritten in place (never grown)
    /// before the spawn; see [`env`].
    ///
    /// # Errors
    /// Fails closed: a spawn error or missing pipe endpoint is returned as
    /// an error and no process handle is constructed.
    pub fn spawn(config: &SymbolizerConfig) -> Result<Self, SymbolizeError> {
        let task_port = env::prepare_task_port_entry(config.pid);

        let mut command = Command::new(&config.tool);
        command.arg("-p").arg(config.pid.0.to_string());
        if config.verbose_backtraces {
            command.arg("-d");
        }
        command
            .env(env::TASK_PORT_ENV_KEY, task_port)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let tool = config.tool.display().to_string();
        let mut child = command.spawn().map_err(|e| SymbolizeError::SpawnFailed {
            tool: tool.clone(),
            error: e.to_string(),
        })?;

        let Some(stdin) = child.stdin.take() else {
            return Err(SymbolizeError::MissingPipes { tool, pid: config.pid });
        };
        let Some(stdout) = child.stdout.take() else {
            return Err(SymbolizeError::MissingPipes { tool, pid: config.pid });
        };

        debug!("Spawned symbolizer {} for {}", tool, config.pid);
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            buffer: String::new(),
            failed: false,
        })
    }

    /// Whether the process is still accepting queries.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.failed
    }

    /// Mark the process unusable; all later queries fail fast.
    pub fn mark_unusable(&mut self) {
        if !self.failed {
            debug!("Symbolizer subprocess invalidated");
        }
        self.failed = true;
    }

    /// Send one newline-terminated command and read one response line.
    ///
    /// Returns the raw response without its trailing newline, or `None` on
    /// any I/O failure (which also invalidates the process).
    pub fn send_command(&mut self, command: &str) -> Option<&str> {
        if self.failed {
            return None;
        }
        if let Err(e) = self.write_command(command) {
            warn!("Failed to write to symbolizer subprocess: {e}");
            self.mark_unusable();
            return None;
        }
        if let Err(e) = self.read_response() {
            warn!("Failed to read from symbolizer subprocess: {e}");
            self.mark_unusable();
            return None;
        }
        Some(self.buffer.trim_end_matches('\n'))
    }

    fn write_command(&mut self, command: &str) -> io::Result<()> {
        self.stdin.write_all(command.as_bytes())?;
        if !command.ends_with('\n') {
            self.stdin.write_all(b"\n")?;
        }
        self.stdin.flush()
    }

    /// Read until a `\n`-terminated line is buffered.
    fn read_response(&mut self) -> io::Result<()> {
        self.buffer.clear();
        loop {
            let read = self.stdout.read_line(&mut self.buffer)?;
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "symbolizer subprocess closed its stdout",
                ));
            }
            if self.reached_end_of_output() {
                return Ok(());
            }
        }
    }

    fn reached_end_of_output(&self) -> bool {
        self.buffer.ends_with('\n')
    }
}

impl Drop for SymbolizerProcess {
    fn drop(&mut self) {
        // Reap the child; errors here are not actionable.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

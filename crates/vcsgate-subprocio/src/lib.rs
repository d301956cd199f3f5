//! Runs a native VCS executable (`git`, `hg`, `svnadmin`, `svnrdump`, ...)
//! with stdin/stdout/stderr wired through background pumps, and exposes the
//! child's stdout as a lazy byte-chunk stream.
//!
//! Git's smart-HTTP protocol streams potentially gigabytes of pack data;
//! buffering the whole response is not an option, and a naive
//! write-stdin-then-read-stdout sequence deadlocks as soon as the child's
//! stdout pipe fills up while it is still waiting for more stdin. The stdin
//! pump therefore runs concurrently with stdout consumption, in its own
//! task, the same way the stderr collector does.

use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

const STDOUT_CHUNK_SIZE: usize = 64 * 1024;
const STDERR_PREFIX_LEN: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum SubprocError {
    #[error("io error running subprocess: {0}")]
    Io(#[from] io::Error),

    #[error("subprocess exited with non-zero status: {0}")]
    NonZeroExit(std::process::ExitStatus),

    #[error("subprocess wrote to stderr: {0}")]
    Stderr(String),
}

pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Construction parameters for a [`SubprocIo`]. Build with
/// [`SpawnParams::new`] and the `with_*` setters, mirroring the keyword-arg
/// shape of the spec's constructor.
pub struct SpawnParams {
    pub argv: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub shell: bool,
    pub input: Option<ByteStream>,
    pub fail_on_return_code: bool,
    pub fail_on_stderr: bool,
    pub starting_values: Vec<Bytes>,
}

impl SpawnParams {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            env: Vec::new(),
            cwd: None,
            shell: false,
            input: None,
            fail_on_return_code: true,
            fail_on_stderr: true,
            starting_values: Vec::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    pub fn input(mut self, input: ByteStream) -> Self {
        self.input = Some(input);
        self
    }

    pub fn fail_on_return_code(mut self, fail: bool) -> Self {
        self.fail_on_return_code = fail;
        self
    }

    pub fn fail_on_stderr(mut self, fail: bool) -> Self {
        self.fail_on_stderr = fail;
        self
    }

    pub fn starting_values(mut self, values: Vec<Bytes>) -> Self {
        self.starting_values = values;
        self
    }
}

/// A running child process plus its stdout chunk producer.
pub struct SubprocIo {
    child: Arc<AsyncMutex<Child>>,
    stdout: Option<tokio::process::ChildStdout>,
    stderr_buf: Arc<AsyncMutex<Vec<u8>>>,
    stderr_seen: Arc<AtomicBool>,
    stdin_pump: Option<JoinHandle<()>>,
    stderr_task: JoinHandle<()>,
    fail_on_return_code: bool,
    fail_on_stderr: bool,
    starting_values: Vec<Bytes>,
}

impl SubprocIo {
    pub fn spawn(params: SpawnParams) -> io::Result<Self> {
        let SpawnParams {
            argv,
            env,
            cwd,
            shell,
            input,
            fail_on_return_code,
            fail_on_stderr,
            starting_values,
        } = params;

        let mut cmd = if shell {
            let mut c = Command::new("sh");
            c.arg("-c").arg(argv.join(" "));
            c
        } else {
            let (prog, rest) = argv.split_first().expect("argv must not be empty");
            let mut c = Command::new(prog);
            c.args(rest);
            c
        };

        cmd.envs(env)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn()?;

        let stdout = child.stdout.take().expect("stdout must be piped");
        let mut stderr = child.stderr.take().expect("stderr must be piped");
        let stdin = child.stdin.take();

        let stderr_buf = Arc::new(AsyncMutex::new(Vec::new()));
        let stderr_seen = Arc::new(AtomicBool::new(false));

        let stderr_task = tokio::spawn({
            let stderr_buf = Arc::clone(&stderr_buf);
            let stderr_seen = Arc::clone(&stderr_seen);
            async move {
                let mut buf = [0u8; 4096];
                loop {
                    match stderr.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            stderr_seen.store(true, Ordering::SeqCst);
                            stderr_buf.lock().await.extend_from_slice(&buf[..n]);
                        }
                    }
                }
            }
        });

        let stdin_pump = input.map(|mut input| {
            tokio::spawn(async move {
                let Some(mut stdin) = stdin else { return };
                while let Some(chunk) = input.next().await {
                    let Ok(chunk) = chunk else { break };
                    if stdin.write_all(&chunk).await.is_err() {
                        break;
                    }
                }
                let _ = stdin.shutdown().await;
            })
        });

        Ok(Self {
            child: Arc::new(AsyncMutex::new(child)),
            stdout: Some(stdout),
            stderr_buf,
            stderr_seen,
            stdin_pump,
            stderr_task,
            fail_on_return_code,
            fail_on_stderr,
            starting_values,
        })
    }

    /// Consumes `self`, producing the stdout chunk stream described in the
    /// spec: `starting_values` first, then stdout chunks until EOF, then the
    /// return-code / stderr policy errors if applicable.
    pub fn stdout_chunks(mut self) -> impl Stream<Item = Result<Bytes, SubprocError>> {
        let stdout = self.stdout.take().expect("stdout already consumed");
        let starting_values = std::mem::take(&mut self.starting_values);

        let state = StreamState {
            subproc: self,
            stdout: Some(stdout),
            pending_starting: starting_values.into_iter(),
            done: false,
        };

        futures::stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }

            if let Some(starting) = state.pending_starting.next() {
                return Some((Ok(starting), state));
            }

            if state.subproc.stderr_seen.load(Ordering::SeqCst) && state.subproc.fail_on_stderr {
                state.done = true;
                let err = state.subproc.stderr_error().await;
                return Some((Err(err), state));
            }

            let stdout = state.stdout.as_mut().expect("stdout polled after EOF");
            let mut buf = vec![0u8; STDOUT_CHUNK_SIZE];
            match stdout.read(&mut buf).await {
                Ok(0) => {
                    state.done = true;
                    match state.subproc.finish().await {
                        Ok(()) => None,
                        Err(e) => Some((Err(e), state)),
                    }
                }
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(Bytes::from(buf)), state))
                }
                Err(e) => {
                    state.done = true;
                    Some((Err(SubprocError::Io(e)), state))
                }
            }
        })
    }

    /// Runs the child to completion, collecting all of stdout into memory.
    /// Used where the spec requires full materialization before a
    /// subsequent step (e.g. `update-server-info` after a push).
    pub async fn wait_collect(self) -> Result<Vec<u8>, SubprocError> {
        let mut stream = Box::pin(self.stdout_chunks());
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    /// Clones a handle to the stderr accumulator so a caller can inspect its
    /// contents after the process finishes, even when `fail_on_stderr` is
    /// false and no diagnostic error ever surfaces through the stdout stream
    /// (e.g. classifying an exit failure by matching text in a tool's normal
    /// progress-on-stderr output).
    pub fn stderr_handle(&self) -> Arc<AsyncMutex<Vec<u8>>> {
        Arc::clone(&self.stderr_buf)
    }

    async fn stderr_error(&self) -> SubprocError {
        let buf = self.stderr_buf.lock().await;
        let prefix_len = buf.len().min(STDERR_PREFIX_LEN);
        let prefix = String::from_utf8_lossy(&buf[..prefix_len]).into_owned();
        SubprocError::Stderr(prefix)
    }

    async fn finish(&mut self) -> Result<(), SubprocError> {
        if let Some(pump) = self.stdin_pump.take() {
            let _ = pump.await;
        }
        let _ = (&mut self.stderr_task).await;

        if self.stderr_seen.load(Ordering::SeqCst) && self.fail_on_stderr {
            return Err(self.stderr_error().await);
        }

        let status = self.child.lock().await.wait().await?;
        if self.fail_on_return_code && !status.success() {
            return Err(SubprocError::NonZeroExit(status));
        }

        Ok(())
    }
}

impl Drop for SubprocIo {
    fn drop(&mut self) {
        if let Some(pump) = self.stdin_pump.take() {
            pump.abort();
        }
        self.stderr_task.abort();
    }
}

struct StreamState {
    subproc: SubprocIo,
    stdout: Option<tokio::process::ChildStdout>,
    pending_starting: std::vec::IntoIter<Bytes>,
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    #[tokio::test]
    async fn stdout_is_forwarded_byte_for_byte() {
        let params = SpawnParams::new(argv("printf hello-world"));
        let io = SubprocIo::spawn(params).unwrap();
        let bytes = io.wait_collect().await.unwrap();
        assert_eq!(bytes, b"hello-world");
    }

    #[tokio::test]
    async fn starting_values_are_yielded_first() {
        let params =
            SpawnParams::new(argv("printf tail")).starting_values(vec![Bytes::from_static(b"head-")]);
        let io = SubprocIo::spawn(params).unwrap();
        let bytes = io.wait_collect().await.unwrap();
        assert_eq!(bytes, b"head-tail");
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_as_error() {
        let params = SpawnParams::new(argv("false"));
        let io = SubprocIo::spawn(params).unwrap();
        let result = io.wait_collect().await;
        assert!(matches!(result, Err(SubprocError::NonZeroExit(_))));
    }

    fn argv_sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn stderr_bytes_fail_iteration_when_configured() {
        let params = SpawnParams::new(argv_sh("echo boom >&2"));
        let io = SubprocIo::spawn(params).unwrap();
        let result = io.wait_collect().await;
        match result {
            Err(SubprocError::Stderr(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected stderr error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stderr_is_ignored_when_fail_on_stderr_is_false() {
        let params = SpawnParams::new(argv_sh("echo boom >&2")).fail_on_stderr(false);
        let io = SubprocIo::spawn(params).unwrap();
        let result = io.wait_collect().await;
        assert!(result.is_ok());
    }
}

//! Looping background audio.
//!
//! The audio file is streamed in fixed-size chunks into the stdin of an
//! external player (`aplay -q -`, `ffplay -nodisp -`, ...). The stop signal is
//! checked between chunks, so stopping takes at most one chunk write.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const CHUNK_SIZE: usize = 4096;

/// How [`pump`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// The reader ran out; the caller may start over.
    Finished,
    /// The stop signal was raised.
    Stopped,
}

/// Copy `reader` into `writer` chunk by chunk until EOF or until `stop`
/// turns true.
pub async fn pump<R, W>(
    reader: &mut R,
    writer: &mut W,
    stop: &watch::Receiver<bool>,
) -> std::io::Result<PumpOutcome>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        if *stop.borrow() {
            return Ok(PumpOutcome::Stopped);
        }
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            writer.flush().await?;
            return Ok(PumpOutcome::Finished);
        }
        writer.write_all(&buf[..n]).await?;
    }
}

/// Split a player command line into program and arguments.
pub fn parse_player_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// A running background loop. Call [`stop`](Self::stop) when the quiz ends.
pub struct BackgroundMusic {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl BackgroundMusic {
    /// Start looping `file` through `player`.
    pub fn start(file: PathBuf, player: &str) -> Result<Self> {
        if !file.is_file() {
            anyhow::bail!("music file not found: {}", file.display());
        }
        let (program, args) = parse_player_command(player)
            .with_context(|| format!("invalid music player command: '{player}'"))?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            if let Err(e) = play_loop(&file, &program, &args, stop_rx).await {
                tracing::warn!("background music stopped: {e:#}");
            }
        });

        Ok(Self { stop_tx, task })
    }

    /// Raise the stop signal and wait briefly for the loop to wind down.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let abort = self.task.abort_handle();
        if tokio::time::timeout(Duration::from_secs(2), self.task).await.is_err() {
            tracing::debug!("music loop did not stop in time, aborting");
            abort.abort();
        }
    }
}

async fn play_loop(
    file: &Path,
    program: &str,
    args: &[String],
    stop: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start music player '{program}'"))?;

        let mut audio = tokio::fs::File::open(file)
            .await
            .with_context(|| format!("failed to open {}", file.display()))?;
        let mut stdin = child
            .stdin
            .take()
            .context("music player has no stdin")?;

        let outcome = pump(&mut audio, &mut stdin, &stop).await;
        drop(stdin);

        match outcome {
            Ok(PumpOutcome::Finished) => {
                child.wait().await.context("music player failed")?;
            }
            Ok(PumpOutcome::Stopped) => {
                let _ = child.kill().await;
                return Ok(());
            }
            Err(e) => {
                let _ = child.kill().await;
                return Err(e).context("failed to stream audio");
            }
        }

        if *stop.borrow() {
            return Ok(());
        }
        tracing::debug!("restarting background music");
    }
}

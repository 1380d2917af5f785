//! The read-eval-print loop.
//!
//! Reads one line at a time and hands it to the evaluator; a line is fully
//! evaluated and rendered before the next is read.

use crate::commands::Evaluator;
use crate::error::Result;
use std::borrow::Cow;
use std::io::IsTerminal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Evaluates each line of `input` until it ends or a quit is requested.
///
/// The prompt is written only when `show_prompt` is set. Returns the number
/// of lines that failed.
pub async fn run<R>(evaluator: &mut Evaluator, mut input: R, show_prompt: bool) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut stdout = tokio::io::stdout();
    let mut failures = 0;

    loop {
        if show_prompt {
            stdout
                .write_all(evaluator.session().prompt().as_bytes())
                .await?;
            stdout.flush().await?;
        }

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            debug!("End of input");
            break;
        }
        let line = decode_line(&buf);
        if !evaluator.run_line(&line).await {
            failures += 1;
        }
        if evaluator.session().quit_requested() {
            info!("Quit requested");
            break;
        }
    }

    Ok(failures)
}

/// Decodes one raw input line without its terminator, replacing invalid UTF-8.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            warn!("Input line is not valid UTF-8");
            line
        }
    }
}

/// Runs the interactive prompt on standard input.
pub async fn run_stdin(evaluator: &mut Evaluator) -> Result<usize> {
    let show_prompt = std::io::stdin().is_terminal();
    run(evaluator, BufReader::new(tokio::io::stdin()), show_prompt).await
}

/// Evaluates the given lines in order, stopping early on quit.
///
/// Returns the number of lines that failed.
pub async fn run_lines(evaluator: &mut Evaluator, lines: &[String]) -> usize {
    let mut failures = 0;
    for line in lines {
        if !evaluator.run_line(line).await {
            failures += 1;
        }
        if evaluator.session().quit_requested() {
            break;
        }
    }
    failures
}

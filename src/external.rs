//! External programs: the pager and the text editor.
//!
//! Both hand the user a temporary file and block until the program exits.

use crate::commands::result::ResultValue;
use crate::config::ProgramConfig;
use crate::error::{DossierError, Result};
use std::io::{self, Write};
use tempfile::NamedTempFile;
use tracing::debug;

/// Flattens a result to plain text: one line per result line, marker and
/// colors removed, groups concatenated.
pub fn flatten_plain(value: &ResultValue) -> String {
    let mut text = String::new();
    for line in value.lines() {
        text.push_str(&line.plain());
        text.push('\n');
    }
    text
}

/// Shows a result in the pager and waits for it to exit.
///
/// The pager's exit status is ignored; only a failure to start it is an error.
pub async fn page(value: &ResultValue, pager: &ProgramConfig) -> io::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(flatten_plain(value).as_bytes())?;
    file.flush()?;

    let status = tokio::process::Command::new(&pager.command)
        .args(&pager.args)
        .arg(file.path())
        .status()
        .await?;
    debug!("Pager '{}' exited with {status}", pager.command);

    Ok(())
}

/// Opens `initial` in the editor and returns the edited text.
pub async fn edit_text(initial: &str, editor: &ProgramConfig) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("dossier_edit")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let status = tokio::process::Command::new(&editor.command)
        .args(&editor.args)
        .arg(file.path())
        .status()
        .await
        .map_err(|e| {
            DossierError::internal(format!("Failed to launch editor '{}': {e}", editor.command))
        })?;

    if !status.success() {
        return Err(DossierError::internal(format!(
            "Editor '{}' exited with non-zero status",
            editor.command
        )));
    }

    Ok(tokio::fs::read_to_string(file.path()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::result::ResultLine;

    fn program(command: &str) -> ProgramConfig {
        ProgramConfig {
            command: command.to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn test_flatten_plain_strips_marker_and_color() {
        let value = ResultValue::Grouped(vec![
            vec![ResultLine::passthrough("\x1b[1m#1\x1b[22m header"), "a".into()],
            vec!["b".into()],
        ]);
        assert_eq!(flatten_plain(&value), "#1 header\na\nb\n");
    }

    #[tokio::test]
    async fn test_page_with_missing_pager_fails() {
        let value = ResultValue::message("line");
        let result = page(&value, &program("dossier-no-such-pager")).await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_page_ignores_exit_status() {
        let value = ResultValue::message("line");
        page(&value, &program("false")).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_edit_text_with_noop_editor_returns_input() {
        let edited = edit_text("unchanged", &program("true")).await.unwrap();
        assert_eq!(edited, "unchanged");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_edit_text_failing_editor() {
        let err = edit_text("x", &program("false")).await.unwrap_err();
        assert!(err.to_string().contains("non-zero status"));
    }
}

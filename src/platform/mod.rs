//! Collaborators a planner needs from its host: asking the user for confirmation and printing.
//! [TerminalPlatform] serves both one-shot commands and the interactive session.

use std::{future::Future, path::PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::info;

/// Contract the host environment of a planner must implement.
pub trait Platform {
    /// Asks a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&mut self, message: &str) -> impl Future<Output = Result<bool>>;

    /// Hands a printable sheet over to the print/export facility.
    fn print(&mut self, sheet: &str) -> impl Future<Output = Result<()>>;
}

/// [Platform] on top of a line based input and a text output. Sheets are written to the output or,
/// when an export path is configured, into that file.
pub struct TerminalPlatform<R, W> {
    input: Lines<R>,
    output: W,
    export_path: Option<PathBuf>,
    assume_yes: bool,
}

impl<R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin> TerminalPlatform<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: input.lines(),
            output,
            export_path: None,
            assume_yes: false,
        }
    }

    pub fn with_export_path(self, export_path: Option<PathBuf>) -> Self {
        Self {
            export_path,
            ..self
        }
    }

    /// Every confirmation is answered with yes without reading input.
    pub fn with_assume_yes(self, assume_yes: bool) -> Self {
        Self { assume_yes, ..self }
    }

    /// Next line of input, `None` once input is closed.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.input.next_line().await?)
    }

    pub async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin> Platform for TerminalPlatform<R, W> {
    async fn confirm(&mut self, message: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        self.write(&format!("{message} [y/N] ")).await?;
        let answer = self.next_line().await?.unwrap_or_default();
        Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    async fn print(&mut self, sheet: &str) -> Result<()> {
        match self.export_path.clone() {
            Some(path) => {
                tokio::fs::write(&path, sheet)
                    .await
                    .with_context(|| format!("Failed to export planner to {path:?}"))?;
                info!("Exported planner to {path:?}");
                self.write(&format!("Exported planner to {}\n", path.display()))
                    .await
            }
            None => self.write(sheet).await,
        }
    }
}

//! Conversion through an external pandoc process.

use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use tracing::debug;

use crate::{ConvertError, DocumentConverter, Result};

/// Runs `pandoc --from <format> --to html`, feeding the document on stdin.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl PandocConverter {
    /// Create a converter using the given pandoc executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DocumentConverter for PandocConverter {
    fn convert(&self, text: &str, format: &str) -> Result<String> {
        let program = self.program.display().to_string();
        debug!(%program, format, bytes = text.len(), "running pandoc");

        let mut child = Command::new(&self.program)
            .args(["--from", format, "--to", "html"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ConvertError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Write stdin while the main thread drains stdout.
        let mut stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || -> std::io::Result<()> {
                if let Some(stdin) = stdin.as_mut() {
                    stdin.write_all(text.as_bytes())?;
                }
                Ok(())
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output?;

        // A failing pandoc may close stdin early; its exit status and stderr win.
        if !output.status.success() {
            if let Err(e) = &written {
                debug!(error = %e, "pandoc stopped reading stdin");
            }
            return Err(ConvertError::Failed {
                program,
                format: format.to_string(),
                status: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        Ok(String::from_utf8(output.stdout)?)
    }
}

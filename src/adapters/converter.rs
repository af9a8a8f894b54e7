use crate::domain::ports::Converter;
use crate::utils::error::{DocsError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

/// PDF renditions through a LibreOffice-compatible binary
/// (`soffice --headless --convert-to pdf`).
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    command: String,
    timeout: Duration,
}

impl SofficeConverter {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Converter for SofficeConverter {
    async fn convert(&self, document_name: &str, document: &[u8]) -> Result<Vec<u8>> {
        let failed = |message: String| DocsError::ConversionError {
            document: document_name.to_string(),
            message,
        };

        // removed on drop, success or not
        let workspace = tempfile::tempdir()?;
        let input = workspace.path().join(document_name);
        tokio::fs::write(&input, document).await?;

        let mut command = Command::new(&self.command);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(workspace.path())
            .arg(&input)
            .kill_on_drop(true);

        tracing::debug!("🖨️ Converting {} with {}", document_name, self.command);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => return Err(failed(format!("timed out after {:?}", self.timeout))),
            Ok(Err(e)) => return Err(failed(format!("could not start '{}': {}", self.command, e))),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("{} exited with {}: {}", self.command, output.status, stderr.trim())));
        }

        tokio::fs::read(input.with_extension("pdf"))
            .await
            .map_err(|e| failed(format!("no PDF produced: {}", e)))
    }
}

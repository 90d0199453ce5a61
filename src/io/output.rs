use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Write;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

/// The single result document printed for every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OutputData {
    pub fn success(message: Option<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }

    pub fn failure(headline: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(headline.into()),
            data: Some(serde_json::json!({ "details": details.into() })),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_markdown(&self) -> serde_json::Result<String> {
        let mut out = String::from("### Output\n\n");
        let _ = writeln!(out, "**Success:** `{}`", self.success);

        if let Some(message) = &self.message {
            let _ = writeln!(out, "\n**Message:** {message}");
        }

        if let Some(data) = &self.data {
            let pretty = serde_json::to_string_pretty(data)?;
            let _ = writeln!(out, "\n#### Data\n\n```json\n{pretty}\n```");
        }

        Ok(out)
    }
}

/// Renders results in the format chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, output: &OutputData) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => output.to_json(),
            OutputFormat::Markdown => output.to_markdown(),
        }
    }

    pub fn emit(&self, output: &OutputData, writer: &mut impl Write) -> std::io::Result<()> {
        let rendered = self.render(output)?;
        writeln!(writer, "{}", rendered.trim_end())?;
        writer.flush()
    }
}

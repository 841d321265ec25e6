//! Output formatting and management

use crate::scanner::HostCheckResult;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Greppable,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "greppable" | "grep" => Ok(OutputFormat::Greppable),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<String>,
    pub colored: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            file: None,
            colored: true,
        }
    }
}

/// Writes results one at a time, as they come off the stream
pub struct OutputManager {
    config: OutputConfig,
    writer: Box<dyn Write + Send>,
}

impl OutputManager {
    /// Open the configured destination. Colour is never written to files.
    pub fn new(mut config: OutputConfig) -> io::Result<Self> {
        let writer: Box<dyn Write + Send> = match &config.file {
            Some(filename) => {
                config.colored = false;
                Box::new(BufWriter::new(File::create(filename)?))
            }
            None => Box::new(io::stdout()),
        };

        Ok(Self { config, writer })
    }

    /// Write to an arbitrary sink
    pub fn with_writer(config: OutputConfig, writer: Box<dyn Write + Send>) -> Self {
        Self { config, writer }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Write one result
    pub fn write_result(&mut self, result: &HostCheckResult) -> io::Result<()> {
        let output = self.format_result(result)?;
        writeln!(self.writer, "{}", output)?;
        self.writer.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn format_result(&self, result: &HostCheckResult) -> io::Result<String> {
        match self.config.format {
            OutputFormat::Text => Ok(self.format_text(result)),
            OutputFormat::Json => self.format_json(result),
            OutputFormat::Greppable => Ok(self.format_greppable(result)),
        }
    }

    /// Tab-aligned report block
    fn format_text(&self, result: &HostCheckResult) -> String {
        if let Some(error) = result.error() {
            return format!(
                "name:\t{}\nerror:\t{}",
                result.name(),
                self.colorize(&format!("could not resolve: {}", error), "red")
            );
        }

        let (status, ports) = if result.is_up() {
            (self.colorize("server is up", "green"), join(result.open_ports()))
        } else {
            (
                self.colorize("server may be down", "yellow"),
                "no known HTTP(S) ports listening".to_string(),
            )
        };

        format!(
            "name:\t{}\nips:\t{}\nstatus:\t{}\nports:\t{}\n",
            result.name(),
            join(result.addresses()),
            status,
            ports
        )
    }

    /// One JSON object per line
    fn format_json(&self, result: &HostCheckResult) -> io::Result<String> {
        serde_json::to_string(result).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn format_greppable(&self, result: &HostCheckResult) -> String {
        match result.error() {
            Some(error) => format!("{}\tERROR\t{}", result.name(), error),
            None => {
                let addresses: Vec<String> = result.addresses().iter().map(ToString::to_string).collect();
                let ports: Vec<String> = result.open_ports().iter().map(ToString::to_string).collect();
                format!("{}\t{}\t{}", result.name(), addresses.join(","), ports.join(","))
            }
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.config.colored {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().bold().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

//! Message sinks
//!
//! The engine is agnostic of where messages go; it only talks to a
//! `MessageSink`.

use crate::engine::Message;
use crate::error::{Error, Result};
use std::io::Write;

/// Receives the tap's messages in emission order
pub trait MessageSink {
    /// Write one message
    fn emit(&mut self, message: &Message) -> Result<()>;
}

/// Output format for JSON-lines sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    #[default]
    Json,
    /// Human-readable output
    Pretty,
}

/// Writes each message as JSON to an `io::Write`
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl JsonLinesWriter<std::io::Stdout> {
    /// Writer on standard output
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write> JsonLinesWriter<W> {
    /// Create a writer over `writer`
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Consume the sink, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MessageSink for JsonLinesWriter<W> {
    fn emit(&mut self, message: &Message) -> Result<()> {
        let value = message.to_json();
        let line = match self.format {
            OutputFormat::Json => serde_json::to_string(&value),
            OutputFormat::Pretty => serde_json::to_string_pretty(&value),
        }
        .map_err(|e| Error::output(format!("Failed to serialize message: {e}")))?;

        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects messages in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Vec<Message>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the sink
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Schema messages only
    pub fn schemas(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_schema())
    }

    /// Record messages only
    pub fn records(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_record())
    }

    /// State messages only
    pub fn states(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_state())
    }
}

impl MessageSink for MemorySink {
    fn emit(&mut self, message: &Message) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }
}

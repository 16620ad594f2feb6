//! CLI output formatting module

use artvector_core::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key/value output
    Pretty,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

/// Output formatter for CLI results
pub struct OutputFormatter {
    format: OutputFormat,
    writer: Box<dyn Write + Send>,
}

impl OutputFormatter {
    /// Create a formatter writing to stdout
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a formatter with a custom writer
    pub fn with_writer<W: Write + Send + 'static>(format: OutputFormat, writer: W) -> Self {
        Self {
            format,
            writer: Box::new(writer),
        }
    }

    /// Format and output a serializable value
    pub fn output<T: Serialize>(&mut self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)?;
                writeln!(self.writer, "{}", json)?;
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(value)?;
                writeln!(self.writer, "{}", yaml)?;
            }
            OutputFormat::Pretty => {
                let json_value = serde_json::to_value(value)?;
                self.write_pretty(&json_value, 0)?;
            }
        }
        Ok(())
    }

    fn write_pretty(&mut self, value: &serde_json::Value, indent: usize) -> Result<()> {
        let pad = "  ".repeat(indent);
        match value {
            serde_json::Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    writeln!(self.writer, "{}[{}]", pad, i + 1)?;
                    self.write_pretty(item, indent + 1)?;
                }
            }
            serde_json::Value::Object(map) => {
                for (key, item) in map {
                    match item {
                        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                            writeln!(self.writer, "{}{}:", pad, key)?;
                            self.write_pretty(item, indent + 1)?;
                        }
                        _ => writeln!(self.writer, "{}{}: {}", pad, key, scalar(item))?,
                    }
                }
            }
            other => writeln!(self.writer, "{}{}", pad, scalar(other))?,
        }
        Ok(())
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        title: String,
        score: f32,
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn render(format: OutputFormat, value: &impl Serialize) -> String {
        let buffer = SharedBuffer::default();
        let mut formatter = OutputFormatter::with_writer(format, buffer.clone());
        formatter.output(value).unwrap();
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_json_output() {
        let rendered = render(
            OutputFormat::Json,
            &Sample {
                title: "amphora".to_string(),
                score: 0.9,
            },
        );
        assert!(rendered.contains("\"title\": \"amphora\""));
    }

    #[test]
    fn test_yaml_output() {
        let rendered = render(
            OutputFormat::Yaml,
            &Sample {
                title: "amphora".to_string(),
                score: 0.9,
            },
        );
        assert!(rendered.contains("title: amphora"));
    }

    #[test]
    fn test_pretty_output() {
        let rendered = render(
            OutputFormat::Pretty,
            &vec![Sample {
                title: "amphora".to_string(),
                score: 0.9,
            }],
        );
        assert!(rendered.contains("[1]"));
        assert!(rendered.contains("title: amphora"));
    }
}

//! Human and JSON rendering for command results

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// How a command reports its outcome
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
    fn info(&self, message: &str);
    /// A `name: value` line, aligned for human output.
    fn field(&self, name: &str, value: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Checkmark-prefixed lines for a terminal
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn failure(&self, message: &str) {
        eprintln!("\u{2717} {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn field(&self, name: &str, value: &str) {
        println!("  {:<24} {}", format!("{name}:"), value);
    }
    fn print_json(&self, _value: &serde_json::Value) {}
}

/// One JSON document per command, built by the caller
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, _message: &str) {}
    fn failure(&self, message: &str) {
        eprintln!("{}", serde_json::json!({"success": false, "error": message}));
    }
    fn info(&self, _message: &str) {}
    fn field(&self, _name: &str, _value: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

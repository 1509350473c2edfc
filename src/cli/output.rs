use std::io::IsTerminal;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Flags win over the config's `default_format`.
    pub fn resolve(json_flag: bool, format_flag: Option<&str>, default_format: &str) -> Self {
        if json_flag {
            return Self::Json;
        }
        match format_flag.unwrap_or(default_format) {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
}

impl OutputOptions {
    pub fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

/// `setting` is the config's color mode: "auto", "always" or "never".
pub fn detect_color(color_flag: bool, setting: &str) -> bool {
    if !color_flag {
        return false;
    }
    match setting {
        "always" => true,
        "never" => false,
        _ => std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_beats_everything() {
        assert_eq!(OutputFormat::resolve(true, Some("text"), "text"), OutputFormat::Json);
    }

    #[test]
    fn format_flag_beats_config() {
        assert_eq!(OutputFormat::resolve(false, Some("json"), "text"), OutputFormat::Json);
        assert_eq!(OutputFormat::resolve(false, Some("text"), "json"), OutputFormat::Text);
    }

    #[test]
    fn config_default_applies_without_flags() {
        assert_eq!(OutputFormat::resolve(false, None, "json"), OutputFormat::Json);
        assert_eq!(OutputFormat::resolve(false, None, "text"), OutputFormat::Text);
    }

    #[test]
    fn no_color_flag_disables_color() {
        assert!(!detect_color(false, "always"));
    }

    #[test]
    fn color_setting_overrides_detection() {
        assert!(detect_color(true, "always"));
        assert!(!detect_color(true, "never"));
    }
}

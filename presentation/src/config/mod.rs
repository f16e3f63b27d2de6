//! Presentation-level configuration
//!
//! How outcomes are rendered, after command-line overrides.

use crate::cli::commands::OutputFormat as CliOutputFormat;
use council_domain::OutputFormat;

/// Output settings for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Apply `-o` and `-q`; command-line flags win over the file.
    pub fn with_cli_overrides(mut self, format: Option<CliOutputFormat>, quiet: bool) -> Self {
        if let Some(format) = format {
            self.format = format.into();
        }
        if quiet {
            self.show_progress = false;
        }
        // Progress bars would corrupt machine-readable output
        if self.format == OutputFormat::Json {
            self.show_progress = false;
        }
        self
    }

    /// Turn terminal colors off process-wide when disabled.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}

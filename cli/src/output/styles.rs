//! Styles for status glyphs and labels.

use owo_colors::Style;

/// Styles applied to tiplay's terminal output. `Default` is unstyled.
#[derive(Default, Clone)]
pub struct Styles {
    /// `✓` lines.
    pub success: Style,
    /// `⚠` lines.
    pub warning: Style,
    /// `→` progress lines.
    pub step: Style,
    /// `ℹ` hints.
    pub info: Style,
    /// Keys of key-value lines.
    pub label: Style,
    /// Plan titles such as `tidb v7.5.0`.
    pub title: Style,
}

impl Styles {
    /// Plain text, for pipes and `--no-color`.
    #[must_use]
    pub fn plain() -> Self {
        Self::default()
    }

    /// ANSI colors for an interactive terminal.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            step: Style::new().cyan(),
            info: Style::new().blue(),
            label: Style::new().dimmed(),
            title: Style::new().bold().cyan(),
        }
    }
}

use crate::progress;
use colored::{ColoredString, Colorize};
use indicatif::ProgressBar;
use reconcile::{Action, ApplyResult, ReportSink};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Plan Lines
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// `create usergroup: x`, `update usergroup: x`, `enable usergroup: x`
    Heading,
    /// `  + ...`
    Added,
    /// `  - ...`
    Removed,
    /// `disable x`
    Disable,
    Plain,
}

const HEADING_PREFIXES: [&str; 3] = [
    "create usergroup: ",
    "update usergroup: ",
    "enable usergroup: ",
];

pub fn line_style(line: &str) -> LineStyle {
    if line.starts_with("  + ") {
        LineStyle::Added
    } else if line.starts_with("  - ") {
        LineStyle::Removed
    } else if line.starts_with("disable ") {
        LineStyle::Disable
    } else if HEADING_PREFIXES.iter().any(|p| line.starts_with(p)) {
        LineStyle::Heading
    } else {
        LineStyle::Plain
    }
}

fn styled(line: &str) -> ColoredString {
    match line_style(line) {
        LineStyle::Heading => line.bold(),
        LineStyle::Added => line.green(),
        LineStyle::Removed => line.red(),
        LineStyle::Disable => line.yellow(),
        LineStyle::Plain => line.normal(),
    }
}

/// Terminal sink for reconciliation runs.
///
/// Output is printed around a spinner so plan lines and results never
/// interleave with its redraws.
pub struct ConsoleReport {
    progress: ProgressBar,
    quiet: bool,
}

impl ConsoleReport {
    pub fn new(quiet: bool, message: &str) -> Self {
        Self {
            progress: progress::spinner(quiet, message),
            quiet,
        }
    }

    pub fn finish(&self) {
        progress::finish_clear(&self.progress);
    }
}

impl ReportSink for ConsoleReport {
    fn line(&mut self, line: &str) {
        let line = styled(line);
        self.progress.suspend(|| println!("{line}"));
    }

    fn diagnostic(&mut self, message: &str) {
        self.progress.suspend(|| warn(message));
    }

    fn on_action_complete(&mut self, action: &Action, result: &ApplyResult) {
        match result {
            ApplyResult::Failed { error: reason } => {
                self.progress.suspend(|| error(&format!("{action}: {reason}")));
            }
            ApplyResult::CreatedWithoutMembers { error: reason } => {
                self.progress
                    .suspend(|| error(&format!("{action}: created, members not set: {reason}")));
            }
            _ if !self.quiet => self.progress.suspend(|| success(&action.to_string())),
            _ => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_style_headings() {
        assert_eq!(line_style("create usergroup: eng"), LineStyle::Heading);
        assert_eq!(line_style("update usergroup: eng"), LineStyle::Heading);
        assert_eq!(line_style("enable usergroup: eng"), LineStyle::Heading);
    }

    #[test]
    fn test_line_style_details() {
        assert_eq!(line_style("  + user alice"), LineStyle::Added);
        assert_eq!(line_style("  + description: Engineers"), LineStyle::Added);
        assert_eq!(line_style("  - user carol"), LineStyle::Removed);
        assert_eq!(line_style("disable old"), LineStyle::Disable);
        assert_eq!(line_style("something else"), LineStyle::Plain);
    }

    #[test]
    fn test_line_style_group_named_like_prefix() {
        // A group called "disable" is still a heading when created
        assert_eq!(line_style("create usergroup: disable"), LineStyle::Heading);
    }

    #[test]
    fn test_line_style_heading_text_mid_line_is_plain() {
        assert_eq!(line_style("note: usergroup: eng unchanged"), LineStyle::Plain);
        assert_eq!(line_style("  delete usergroup: eng"), LineStyle::Plain);
    }
}

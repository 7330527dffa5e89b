//! Styled output formatting using anstyle.
//!
//! Colored terminal rendering for the default human-readable CLI mode. Colors
//! are disabled automatically when stdout is not a terminal or `NO_COLOR` is
//! set, and explicitly with `--no-color`.

use anstyle::{AnsiColor, Color, Style};
use std::fmt::Write;
use std::io::IsTerminal;

use crate::lookup::LookupReport;

/// Style definitions for the UI elements
pub struct Styles {
    pub header: Style,
    pub label: Style,
    pub value: Style,
    pub warning: Style,
    pub muted: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            header: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Blue))),
            label: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            value: Style::new().bold(),
            warning: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
            muted: Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))),
        }
    }
}

/// Styled formatter for lookup reports
pub struct StyledFormatter {
    styles: Styles,
    use_colors: bool,
}

impl StyledFormatter {
    /// Create a new styled formatter
    pub fn new() -> Self {
        Self {
            styles: Styles::default(),
            use_colors: Self::should_use_colors(),
        }
    }

    /// Create a formatter without colors (for non-interactive use)
    pub fn without_colors() -> Self {
        Self {
            styles: Styles::default(),
            use_colors: false,
        }
    }

    /// Determine if colors should be used based on environment
    fn should_use_colors() -> bool {
        std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
    }

    /// Apply style to text if colors are enabled
    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    /// Format a completed lookup for the terminal
    pub fn format_report(&self, report: &LookupReport) -> Result<String, std::fmt::Error> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(
            output,
            "{}",
            self.styled(
                &format!("WHOIS result for {}", report.query),
                &self.styles.header
            )
        )?;
        writeln!(
            output,
            "{} {}",
            self.styled("Server:", &self.styles.label),
            self.styled(&report.server, &self.styles.value)
        )?;

        if let Some(ref referral) = report.referral {
            let note = if report.referral_followed {
                format!("Referral followed: {}", referral)
            } else {
                format!("Referral seen (not followed): {}", referral)
            };
            writeln!(output, "{}", self.styled(&note, &self.styles.muted))?;
        }

        writeln!(output)?;
        if report.response.is_empty() {
            let message = if report.upstream_unreachable {
                "(no response - server unreachable)"
            } else {
                "(no response)"
            };
            writeln!(output, "{}", self.styled(message, &self.styles.warning))?;
        } else {
            writeln!(output, "{}", report.response)?;
        }

        for warning in &report.warnings {
            writeln!(
                output,
                "{}",
                self.styled(&format!("warning: {}", warning), &self.styles.warning)
            )?;
        }

        writeln!(
            output,
            "{}",
            self.styled(
                &format!("completed in {} ms", report.duration_ms),
                &self.styles.muted
            )
        )?;

        Ok(output)
    }

    /// Format and print to stdout
    pub fn print_report(&self, report: &LookupReport) -> Result<(), std::fmt::Error> {
        print!("{}", self.format_report(report)?);
        Ok(())
    }
}

impl Default for StyledFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::QueryKind;

    fn report() -> LookupReport {
        LookupReport {
            query: "example.com".to_string(),
            server: "whois.verisign-grs.com".to_string(),
            response: "Domain Name: EXAMPLE.COM".to_string(),
            kind: QueryKind::Domain,
            referral: None,
            referral_followed: false,
            upstream_unreachable: false,
            duration_ms: 42,
            warnings: vec![],
        }
    }

    #[test]
    fn plain_rendering_contains_the_contract_fields() {
        let text = StyledFormatter::without_colors()
            .format_report(&report())
            .unwrap();
        assert!(text.contains("WHOIS result for example.com"));
        assert!(text.contains("whois.verisign-grs.com"));
        assert!(text.contains("Domain Name: EXAMPLE.COM"));
        assert!(text.contains("42 ms"));
        // No ANSI escapes without colors.
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn referral_note_is_shown() {
        let mut r = report();
        r.referral = Some("whois.example-registrar.com".to_string());
        r.referral_followed = true;
        let text = StyledFormatter::without_colors().format_report(&r).unwrap();
        assert!(text.contains("Referral followed: whois.example-registrar.com"));
    }

    #[test]
    fn unreachable_upstream_is_flagged() {
        let mut r = report();
        r.response = String::new();
        r.upstream_unreachable = true;
        let text = StyledFormatter::without_colors().format_report(&r).unwrap();
        assert!(text.contains("server unreachable"));
    }

    #[test]
    fn warnings_are_rendered() {
        let mut r = report();
        r.warnings.push("referral target returned empty".to_string());
        let text = StyledFormatter::without_colors().format_report(&r).unwrap();
        assert!(text.contains("warning: referral target returned empty"));
    }
}

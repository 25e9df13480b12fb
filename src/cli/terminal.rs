//! Colouring of solver output: flow regimes, inlet bypass warnings and stale
//! project scenarios. Colour is dropped when stdout cannot show it.

use hydrocalc::FlowRegime;
use owo_colors::{OwoColorize, colors::css};

fn stdout_has_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// True on terminals under 60 columns, where result tables collapse to one
/// `label: value` pair per line.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < 60)
}

/// Status colouring for result lines.
pub trait Colorize {
    /// Green: subcritical flow, full interception, up-to-date scenarios.
    fn success(&self) -> String;
    /// Amber: supercritical flow, bypass, stale or failed scenarios.
    fn warning(&self) -> String;
    /// Blue: critical flow and saved-scenario notices.
    fn info(&self) -> String;
    /// Dimmed: units, ids and hints.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::Orange>().to_string())
    }

    fn info(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::LightBlue>().to_string())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), |text| text.dimmed().to_string())
    }
}

fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if stdout_has_color() {
        style(text)
    } else {
        text.to_owned()
    }
}

/// Regime label coloured by severity: supercritical flow is flagged.
pub fn regime(regime: FlowRegime) -> String {
    let label = regime.to_string();
    match regime {
        FlowRegime::Subcritical => label.success(),
        FlowRegime::Critical => label.info(),
        FlowRegime::Supercritical => label.warning(),
    }
}

/// Prints `label  value unit` lines, aligned unless the terminal is narrow.
pub fn print_rows(rows: &[(&str, String, &str)]) {
    if is_narrow() {
        for (label, value, unit) in rows {
            println!("{label}: {value} {unit}");
        }
        return;
    }

    let width = rows.iter().map(|(label, ..)| label.len()).max().unwrap_or_default();
    for (label, value, unit) in rows {
        let line = format!("  {label:<width$}  {value} {}", unit.dim());
        println!("{}", line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regime_label_keeps_its_text() {
        for (flow_regime, label) in [
            (FlowRegime::Subcritical, "Subcritical"),
            (FlowRegime::Critical, "Critical"),
            (FlowRegime::Supercritical, "Supercritical"),
        ] {
            assert!(regime(flow_regime).contains(label));
        }
    }
}

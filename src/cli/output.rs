//! Output formatting for CLI results

use colorful::{Color, Colorful};

use crate::detection::{Confidence, FileReport, Key};

/// Format one report for terminal output
pub fn format_report(report: &FileReport, verbose: bool) -> String {
    let mut output = String::new();

    let key_label = if report.key == Key::Silence {
        "silence".to_string()
    } else {
        format!("{} ({})", report.key_name, report.short_name)
    };

    output.push_str(&format!(
        "{} {}\n",
        report.confidence.symbol().color(confidence_color(report.confidence)),
        report.file_path.as_str().bold()
    ));
    output.push_str(&format!(
        "  Key: {}  score {:.3}\n",
        key_label.color(confidence_color(report.confidence)).bold(),
        report.score
    ));

    if verbose {
        output.push_str(&format!(
            "  {} Hz, {} ch, {:.1}s\n",
            report.sample_rate, report.channels, report.duration_secs
        ));
        for (name, score) in &report.alternatives {
            output.push_str(&format!("    {:<10} {:.3}\n", name, score));
        }
    }

    output
}

fn confidence_color(confidence: Confidence) -> Color {
    match confidence {
        Confidence::High => Color::Green,
        Confidence::Medium => Color::Yellow,
        Confidence::Low => Color::Red,
    }
}

/// Format all reports as a pretty-printed JSON array
pub fn format_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// Format a summary for multiple files
pub fn format_summary(reports: &[FileReport], failures: usize) -> String {
    let mut output = String::new();

    let count = |c: Confidence| reports.iter().filter(|r| r.confidence == c).count();
    let silent = reports.iter().filter(|r| r.key == Key::Silence).count();

    output.push_str(&format!("\n{}\n", "Summary:".bold()));
    output.push_str(&format!("  {} files analyzed\n", reports.len()));

    let high = count(Confidence::High);
    if high > 0 {
        output.push_str(&format!("  {}\n", format!("✓ {} confident", high).green()));
    }
    let medium = count(Confidence::Medium);
    if medium > 0 {
        output.push_str(&format!("  {}\n", format!("~ {} tentative", medium).yellow()));
    }
    let low = count(Confidence::Low);
    if low > 0 {
        output.push_str(&format!("  {}\n", format!("? {} ambiguous", low).red()));
    }
    if silent > 0 {
        output.push_str(&format!("  {} silent\n", silent));
    }
    if failures > 0 {
        output.push_str(&format!("  {}\n", format!("✗ {} failed", failures).red()));
    }

    output
}

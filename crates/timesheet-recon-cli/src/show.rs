use anstyle::{AnsiColor, Color, Style};
use timesheet_recon::Report;
use timesheet_recon::report::Summary;

pub fn show_discrepancies(report: &Report) {
    let over_style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    let under_style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
    let flagged_style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));

    for row in report.discrepancies() {
        // Positive means more hours were reported than tracked.
        let style = if row.discrepancy.is_sign_positive() {
            over_style
        } else {
            under_style
        };
        let period = row
            .period_start
            .map(|date| date.to_string())
            .unwrap_or_else(|| "unknown period".to_owned());
        println!(
            "{style}━━━ {} ({}) week of {period} ━━━{style:#}",
            row.name,
            row.staff_id.as_deref().unwrap_or("no id"),
        );
        println!(
            "  email {}, owner {}",
            row.email.as_deref().unwrap_or("unresolved"),
            row.owner.as_deref().unwrap_or("unresolved"),
        );
        println!(
            "  primary {} h, secondary {} h, discrepancy {style}{}{style:#} h",
            row.primary_hours.normalize(),
            row.secondary_hours.normalize(),
            row.discrepancy.normalize(),
        );
        println!();
    }

    for row in &report.flagged {
        println!(
            "{flagged_style}━━━ Flagged: {} ({}) is {} ━━━{flagged_style:#}",
            row.name,
            row.staff_id.as_deref().unwrap_or("no id"),
            row.status,
        );
    }
    if !report.flagged.is_empty() {
        println!();
    }

    print_summary(&report.summary());
}

pub fn print_summary(summary: &Summary) {
    let bold = Style::new().bold();
    let warn = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

    if summary.discrepant_rows == 0 {
        println!("✓ All {} timesheet line(s) reconcile!", summary.reconciled_rows);
    } else {
        println!("{bold}━━━ Summary ━━━{bold:#}");
        println!(
            "  {warn}{}{warn:#} of {} timesheet line(s) with a discrepancy",
            summary.discrepant_rows, summary.reconciled_rows
        );
    }
    println!(
        "  {} h reported, {} h tracked",
        summary.primary_hours.normalize(),
        summary.secondary_hours.normalize()
    );
    if summary.flagged_rows > 0 {
        println!("  {} line(s) not yet approved", summary.flagged_rows);
    }
    if summary.unresolved_identities > 0 {
        println!(
            "  {warn}{}{warn:#} staff id(s) without a mapping",
            summary.unresolved_identities
        );
    }
    if summary.unparsed_period_labels > 0 {
        println!(
            "  {} period label(s) matched by entry date only",
            summary.unparsed_period_labels
        );
    }
}

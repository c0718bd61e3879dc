use crate::aggregate::Metric;
use crate::models::{
    DashboardSummary, Dataset, DeltaPoint, FailureMetrics, PeriodMetrics, ShareMetrics,
};
use crate::quality::DataQualityWarning;
use chrono::NaiveDateTime;

/// Fills the page template with already computed metrics.
pub fn render_dashboard(
    summary: &DashboardSummary,
    dataset: &Dataset,
    rendered_at: NaiveDateTime,
) -> String {
    let currency = escape_html(&summary.currency);
    let monthly = &summary.monthly;

    let latest_class = match monthly.latest_volume_delta.value() {
        Some(delta) if delta.decline => "value decline",
        _ => "value",
    };

    let values = [
        ("CURRENCY", currency.clone()),
        (
            "TOTAL_TX",
            format_metric(&monthly.total_transactions, |v| format_count(*v)),
        ),
        (
            "AVG_TX",
            format_metric(&monthly.mean_transactions_all, |v| format_count(v.round() as u64)),
        ),
        (
            "AVG_TX_ACTIVE",
            format_metric(&monthly.mean_transactions_active, |v| {
                format_count(v.round() as u64)
            }),
        ),
        (
            "RATE_MEAN",
            format_metric(&monthly.success_rate_all, |v| format_percent(*v, 1)),
        ),
        (
            "RATE_ACTIVE",
            format_metric(&monthly.success_rate_active, |v| format_percent(*v, 1)),
        ),
        (
            "RATE_WEIGHTED",
            format_metric(&monthly.success_rate_weighted, |v| format_percent(*v, 1)),
        ),
        (
            "RATE_PEAK",
            format_metric(&monthly.peak_success_rate, |peak| {
                format!("{} ({})", escape_html(&peak.label), format_percent(peak.value, 1))
            }),
        ),
        (
            "TOTAL_VOLUME",
            format_metric(&monthly.total_volume, |v| format_volume(*v, &currency)),
        ),
        (
            "AVG_VOLUME",
            format_metric(&monthly.mean_volume_all, |v| format_volume(*v, &currency)),
        ),
        (
            "SENDERS",
            format_metric(&monthly.total_unique_senders, |v| format_count(*v)),
        ),
        (
            "RECIPIENTS",
            format_metric(&monthly.total_unique_recipients, |v| format_count(*v)),
        ),
        (
            "KNOWN_COUNTRIES",
            summary.countries.known_entities.to_string(),
        ),
        ("LATEST_CLASS", latest_class.to_string()),
        (
            "LATEST_DELTA",
            format_metric(&monthly.latest_volume_delta, |delta| {
                format!(
                    "{} vs {}: {}",
                    escape_html(&delta.current),
                    escape_html(&delta.previous),
                    format_relative(&delta.relative)
                )
            }),
        ),
        ("MONTHLY_ROWS", monthly_rows(dataset, monthly, &currency)),
        ("HOURLY_ROWS", hourly_rows(dataset, &summary.hourly, &currency)),
        ("COUNTRY_ROWS", share_rows(&summary.countries, &currency)),
        ("CLIENT_ROWS", share_rows(&summary.clients, &currency)),
        ("FAILURE_ROWS", failure_rows(&summary.failures)),
        (
            "TOTAL_FAILURES",
            format_metric(&summary.failures.total_failures, |v| format_count(*v)),
        ),
        ("WARNINGS", warning_items(&summary.warnings)),
        (
            "RENDERED_AT",
            rendered_at.format("%Y-%m-%d %H:%M").to_string(),
        ),
    ];

    fill_template(INDEX_HTML, &values)
}

/// Substitutes `{{NAME}}` placeholders in one pass, so substituted text is
/// never scanned again. Unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 4]),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

fn monthly_rows(dataset: &Dataset, metrics: &PeriodMetrics, currency: &str) -> String {
    dataset
        .monthly
        .iter()
        .enumerate()
        .map(|(index, period)| {
            let change = index
                .checked_sub(1)
                .and_then(|previous| metrics.volume_deltas.get(previous))
                .map(delta_cell)
                .unwrap_or_else(|| "<td>-</td>".to_string());
            let rate = period
                .success_rate
                .map(|rate| format_percent(rate, 2))
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
                escape_html(&period.label),
                format_count(period.transaction_count),
                format_volume(period.volume, currency),
                rate,
                change
            )
        })
        .collect()
}

fn hourly_rows(dataset: &Dataset, metrics: &PeriodMetrics, currency: &str) -> String {
    let busiest = metrics.peak_transactions.value().map(|peak| peak.label.as_str());
    dataset
        .hourly
        .iter()
        .map(|slot| {
            let class = if Some(slot.label.as_str()) == busiest {
                " class=\"peak\""
            } else {
                ""
            };
            format!(
                "<tr{class}><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&slot.label),
                format_count(slot.transaction_count),
                format_volume(slot.volume, currency)
            )
        })
        .collect()
}

fn share_rows(metrics: &ShareMetrics, currency: &str) -> String {
    metrics
        .ranked
        .iter()
        .map(|row| {
            let width = row.computed_share.value().copied().unwrap_or(0.0);
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><span class=\"bar\" style=\"width: {width:.2}%\"></span>{}</td></tr>",
                escape_html(&row.label),
                format_volume(row.volume, currency),
                format_count(row.transaction_count),
                format_percent(row.recorded_share, 2),
                format_metric(&row.computed_share, |v| format_percent(*v, 2))
            )
        })
        .collect()
}

fn failure_rows(metrics: &FailureMetrics) -> String {
    metrics
        .reasons
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.reason),
                format_count(row.count),
                format_percent(row.recorded_percentage, 2),
                format_metric(&row.computed_percentage, |v| format_percent(*v, 2))
            )
        })
        .collect()
}

fn warning_items(warnings: &[DataQualityWarning]) -> String {
    if warnings.is_empty() {
        return "<li class=\"ok\">No data-quality warnings.</li>".to_string();
    }
    warnings
        .iter()
        .map(|warning| {
            format!(
                "<li><strong>{}</strong> {}</li>",
                warning.set,
                escape_html(&warning.detail)
            )
        })
        .collect()
}

fn delta_cell(delta: &DeltaPoint) -> String {
    let class = if delta.decline { "decline" } else { "growth" };
    format!(
        "<td class=\"{class}\">{}</td>",
        format_relative(&delta.relative)
    )
}

fn format_relative(relative: &Metric<f64>) -> String {
    format_metric(relative, |v| format!("{v:+.1}%"))
}

pub fn format_metric<T>(metric: &Metric<T>, format: impl Fn(&T) -> String) -> String {
    metric
        .value()
        .map(format)
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_volume(value: f64, currency: &str) -> String {
    if value.abs() >= 1e9 {
        format!("{currency} {:.2}B", value / 1e9)
    } else if value.abs() >= 1e6 {
        format!("{currency} {:.1}M", value / 1e6)
    } else {
        format!("{currency} {}", format_count(value.round() as u64))
    }
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Transfer Analytics Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Bebas+Neue&display=swap');

    :root {
      --bg: #f4f6f8;
      --ink: #2c3e50;
      --muted: #7b8a97;
      --accent: #18bc9c;
      --decline: #e74c3c;
      --card: #ffffff;
      --shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
      padding: 32px 18px 48px;
    }

    h1, h2, .card h3 {
      font-family: "Bebas Neue", sans-serif;
      letter-spacing: 0.04em;
      margin: 0;
    }

    h1 {
      text-align: center;
      font-size: clamp(2rem, 4vw, 3rem);
      margin-bottom: 24px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
      margin-bottom: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 8px;
      box-shadow: var(--shadow);
      padding: 18px;
    }

    .card .value {
      font-size: 1.8rem;
      font-weight: 600;
      color: var(--ink);
      margin: 8px 0;
    }

    .card .value.decline,
    td.decline {
      color: var(--decline);
    }

    td.growth {
      color: var(--accent);
    }

    .card p {
      margin: 4px 0;
      color: var(--muted);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      margin-top: 12px;
    }

    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid rgba(44, 62, 80, 0.08);
    }

    tr.peak {
      background: rgba(24, 188, 156, 0.12);
      font-weight: 600;
    }

    .bar {
      display: inline-block;
      height: 8px;
      margin-right: 8px;
      background: var(--accent);
      border-radius: 4px;
      vertical-align: middle;
      max-width: 120px;
    }

    ul.warnings {
      margin: 12px 0 0;
      padding-left: 20px;
    }

    ul.warnings li.ok {
      color: var(--accent);
      list-style: none;
    }

    footer {
      text-align: center;
      color: var(--muted);
      font-size: 0.85rem;
      margin-top: 32px;
    }
  </style>
</head>
<body>
  <h1>Transfer Analytics Dashboard</h1>

  <section class="grid">
    <div class="card">
      <h3>Total Transactions</h3>
      <div class="value">{{TOTAL_TX}}</div>
      <p>Monthly average: {{AVG_TX}}</p>
      <p>Active months average: {{AVG_TX_ACTIVE}}</p>
    </div>
    <div class="card">
      <h3>Average Success Rate</h3>
      <div class="value">{{RATE_MEAN}}</div>
      <p>Active months: {{RATE_ACTIVE}}</p>
      <p>Transaction weighted: {{RATE_WEIGHTED}}</p>
      <p>Peak: {{RATE_PEAK}}</p>
    </div>
    <div class="card">
      <h3>Total Volume ({{CURRENCY}})</h3>
      <div class="value">{{TOTAL_VOLUME}}</div>
      <p>Monthly average: {{AVG_VOLUME}}</p>
    </div>
    <div class="card">
      <h3>User Activity</h3>
      <p>Senders: {{SENDERS}}</p>
      <p>Recipients: {{RECIPIENTS}}</p>
      <p>Active countries: {{KNOWN_COUNTRIES}}</p>
    </div>
    <div class="card">
      <h3>Latest Volume Change</h3>
      <div class="{{LATEST_CLASS}}">{{LATEST_DELTA}}</div>
    </div>
  </section>

  <section class="card">
    <h2>Monthly Trends</h2>
    <table>
      <thead><tr><th>Month</th><th>Transactions</th><th>Volume</th><th>Success Rate</th><th>Volume Change</th></tr></thead>
      <tbody>{{MONTHLY_ROWS}}</tbody>
    </table>
  </section>

  <section class="grid" style="margin-top: 24px;">
    <div class="card">
      <h2>Volume by Country</h2>
      <table>
        <thead><tr><th>Country</th><th>Volume</th><th>Transactions</th><th>Recorded</th><th>Computed</th></tr></thead>
        <tbody>{{COUNTRY_ROWS}}</tbody>
      </table>
    </div>
    <div class="card">
      <h2>Client Market Share</h2>
      <table>
        <thead><tr><th>Client</th><th>Volume</th><th>Transactions</th><th>Recorded</th><th>Computed</th></tr></thead>
        <tbody>{{CLIENT_ROWS}}</tbody>
      </table>
    </div>
  </section>

  <section class="grid">
    <div class="card">
      <h2>Failure Reasons ({{TOTAL_FAILURES}})</h2>
      <table>
        <thead><tr><th>Reason</th><th>Count</th><th>Recorded</th><th>Computed</th></tr></thead>
        <tbody>{{FAILURE_ROWS}}</tbody>
      </table>
    </div>
    <div class="card">
      <h2>Intraday Activity</h2>
      <table>
        <thead><tr><th>Slot</th><th>Transactions</th><th>Volume</th></tr></thead>
        <tbody>{{HOURLY_ROWS}}</tbody>
      </table>
    </div>
  </section>

  <section class="card">
    <h2>Data Quality</h2>
    <ul class="warnings">{{WARNINGS}}</ul>
  </section>

  <footer>Rendered {{RENDERED_AT}}</footer>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::stats::build_summary;
    use chrono::NaiveDate;

    fn rendered_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(52327), "52,327");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn volumes_are_scaled() {
        assert_eq!(format_volume(3_081_858_563.11, "KES"), "KES 3.08B");
        assert_eq!(format_volume(523_575_404.54, "KES"), "KES 523.6M");
        assert_eq!(format_volume(1500.4, "KES"), "KES 1,500");
    }

    #[test]
    fn dashboard_shows_builtin_metrics() {
        let dataset = Dataset::builtin();
        let summary = build_summary(&dataset, &Settings::default());
        let html = render_dashboard(&summary, &dataset, rendered_at());

        assert!(html.contains("52,327"));
        assert!(html.contains("December (86.8%)"));
        assert!(html.contains("KES 3.08B"));
        assert!(html.contains("Insufficient Balance"));
        assert!(html.contains("class=\"value decline\""));
        assert!(html.contains("No data-quality warnings."));
        assert!(html.contains("Rendered 2026-01-05 09:30"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn missing_metrics_render_as_not_applicable() {
        let mut dataset = Dataset::builtin();
        dataset.monthly.clear();
        dataset.clients[0].client_name = "<script>".to_string();
        let summary = build_summary(&dataset, &Settings::default());
        let html = render_dashboard(&summary, &dataset, rendered_at());

        assert!(html.contains("<div class=\"value\">N/A</div>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn labels_that_look_like_placeholders_stay_literal() {
        let mut dataset = Dataset::builtin();
        dataset.clients[3].client_name = "{{TOTAL_FAILURES}}".to_string();
        dataset.failures[0].reason = "{{WARNINGS}}".to_string();
        let summary = build_summary(&dataset, &Settings::default());
        let html = render_dashboard(&summary, &dataset, rendered_at());

        assert!(html.contains("<td>{{TOTAL_FAILURES}}</td>"));
        assert!(html.contains("<td>{{WARNINGS}}</td>"));
        assert!(html.contains("Failure Reasons (9,279)"));
    }

    #[test]
    fn template_fill_is_single_pass() {
        let values = [("A", "{{B}}".to_string()), ("B", "b".to_string())];
        assert_eq!(fill_template("{{A}} {{B}} {{C}} {{", &values), "{{B}} b {{C}} {{");
    }
}

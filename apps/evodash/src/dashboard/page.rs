//! # Dashboard Page
//!
//! Renders the single dashboard page from a [`Report`].

use super::svg;
use evodash_core::{MeanDelta, Report};

const STYLE: &str = "
body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; color: #222; }
h1 { margin-bottom: 0.2rem; }
.source { color: #666; font-size: 0.9rem; }
.metrics { display: flex; gap: 1rem; margin: 1.5rem 0; }
.metric { flex: 1; border: 1px solid #ddd; border-radius: 6px; padding: 0.8rem 1rem; }
.metric .label { color: #666; font-size: 0.9rem; }
.metric .value { font-size: 1.8rem; font-weight: bold; }
.metric .samples { color: #888; font-size: 0.8rem; }
table { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
th, td { border-bottom: 1px solid #eee; padding: 0.25rem 0.5rem; text-align: right; }
th:first-child, td:first-child { text-align: left; }
";

/// Escape text for HTML element content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn metric_card(mean: &MeanDelta) -> String {
    let value = mean
        .rounded()
        .map(|v| format!("{:+} pts", v))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div><div class=\"samples\">{} evolutions</div></div>\n",
        escape(mean.label()),
        value,
        mean.samples
    )
}

/// Render the full dashboard page.
pub fn render_page(report: &Report, source: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Evolution Power Dashboard</title>\n");
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

    html.push_str("<h1>Evolution Power Dashboard</h1>\n");
    html.push_str(&format!(
        "<p class=\"source\">Source: {}</p>\n",
        escape(source)
    ));
    html.push_str(
        "<p>How much raw power does a creature gain when it evolves? \
         Total base stats are compared between consecutive members of each \
         evolution family.</p>\n",
    );

    // 1. Average jump
    html.push_str("<h2>1. Average power jump</h2>\n<div class=\"metrics\">\n");
    html.push_str(&metric_card(&report.summary.first_evolution));
    html.push_str(&metric_card(&report.summary.second_evolution));
    html.push_str("</div>\n");
    html.push_str(&svg::bar_chart(&report.bars));

    // 2. Distribution
    html.push_str("<h2>2. Not every evolution is equal</h2>\n");
    html.push_str("<p>Each point is one creature; hover to see its name.</p>\n");
    html.push_str(&svg::box_plot(&report.distribution));

    // 3. Flow
    if let Some(flow) = svg::flow_diagram(&report.flow) {
        html.push_str("<h2>3. Path of evolution</h2>\n");
        html.push_str("<p>From evolution trigger to the stage reached.</p>\n");
        html.push_str(&flow);
    }

    // 4. Raw table
    html.push_str(&format!(
        "<details>\n<summary>Raw family table ({} rows)</summary>\n<table>\n",
        report.table.len()
    ));
    html.push_str(
        "<thead><tr><th>Name</th><th>Family</th><th>Stage</th><th>Score</th><th>Delta</th></tr></thead>\n<tbody>\n",
    );
    for row in &report.table {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&row.name),
            row.family,
            row.stage,
            row.score,
            row.delta.map(|d| d.to_string()).unwrap_or_default()
        ));
    }
    html.push_str("</tbody>\n</table>\n</details>\n</body>\n</html>\n");
    html
}

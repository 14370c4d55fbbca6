//! Plain-text gantt rendering of a trace tree.

use crate::tree::{format_duration, Trace};

const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 48;

/// Render one line per span: indented name, service, timeline bar, duration
pub fn render_trace(trace: &Trace, max_depth: Option<usize>) -> String {
    let viewport = trace.viewport();
    let mut lines = Vec::with_capacity(trace.span_count() + 1);

    lines.push(format!(
        "  {:<width$} {:<bar$} {}",
        "Span",
        "Timeline",
        format_duration(trace.duration_ms()),
        width = LABEL_WIDTH,
        bar = BAR_WIDTH + 2
    ));

    for row in trace.rows() {
        if max_depth.is_some_and(|max| row.depth > max) {
            continue;
        }

        let span = trace.span(row.span);
        let label = format!(
            "{}{} [{}]",
            "  ".repeat(row.depth),
            span.name,
            span.resource.service_name
        );
        let label = truncate(&label, LABEL_WIDTH);

        // Every span gets at least one cell so zero-length spans stay visible
        let offset = ((viewport.relative_start(span) * BAR_WIDTH as f64) as usize).min(BAR_WIDTH - 1);
        let width = ((viewport.relative_duration(span) * BAR_WIDTH as f64).round() as usize)
            .clamp(1, BAR_WIDTH - offset);
        let bar = format!(
            "{}{}{}",
            " ".repeat(offset),
            if span.status.is_error() { "!" } else { "█" }.repeat(width),
            " ".repeat(BAR_WIDTH - offset - width)
        );

        lines.push(format!(
            "  {:<width$} |{}| {}",
            label,
            bar,
            format_duration(span.duration_ms()),
            width = LABEL_WIDTH
        ));
    }

    lines.join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

//! Row layout helpers for gantt-style trace views.

use super::trace_tree::{Span, SpanIndex, Trace};

/// One row of a gantt listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanRow {
    pub span: SpanIndex,
    /// Roots are at depth 0
    pub depth: usize,
}

impl Trace {
    /// Every span in depth-first order
    ///
    /// Roots come in payload order and children in ascending start time,
    /// which is the order a gantt chart lists its rows.
    pub fn rows(&self) -> Vec<SpanRow> {
        let mut rows = Vec::with_capacity(self.span_count());
        let mut stack: Vec<SpanRow> = self
            .root_spans()
            .iter()
            .rev()
            .map(|&span| SpanRow { span, depth: 0 })
            .collect();

        while let Some(row) = stack.pop() {
            rows.push(row);
            for &child in self.span(row.span).children().iter().rev() {
                stack.push(SpanRow {
                    span: child,
                    depth: row.depth + 1,
                });
            }
        }

        rows
    }

    /// Viewport covering the whole trace
    pub fn viewport(&self) -> Viewport {
        Viewport {
            start_time_unix_ms: self.start_time_unix_ms,
            end_time_unix_ms: self.end_time_unix_ms,
        }
    }
}

/// Visible time window of a gantt chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub start_time_unix_ms: f64,
    pub end_time_unix_ms: f64,
}

impl Viewport {
    pub fn duration_ms(&self) -> f64 {
        self.end_time_unix_ms - self.start_time_unix_ms
    }

    /// Offset of the span bar as a fraction of the viewport width
    pub fn relative_start(&self, span: &Span) -> f64 {
        let duration = self.duration_ms();
        if duration <= 0.0 {
            return 0.0;
        }
        (span.start_time_unix_ms - self.start_time_unix_ms) / duration
    }

    /// Width of the span bar as a fraction of the viewport width
    pub fn relative_duration(&self, span: &Span) -> f64 {
        let duration = self.duration_ms();
        if duration <= 0.0 {
            return 0.0;
        }
        span.duration_ms() / duration
    }
}

/// Format a millisecond duration for display
///
/// # Examples
/// ```
/// use perses_trace::tree::format_duration;
/// assert_eq!(format_duration(0.5), "500μs");
/// assert_eq!(format_duration(12.5), "12.5ms");
/// assert_eq!(format_duration(1250.0), "1.25s");
/// ```
pub fn format_duration(ms: f64) -> String {
    if ms < 1.0 {
        format!("{}μs", trim_decimals(ms * 1000.0))
    } else if ms < 1000.0 {
        format!("{}ms", trim_decimals(ms))
    } else {
        format!("{}s", trim_decimals(ms / 1000.0))
    }
}

// Two decimals at most, no trailing zeros
fn trim_decimals(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

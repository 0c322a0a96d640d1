//! Prometheus text exposition format (version 0.0.4).
//!
//! Every metric renders as a HELP line, a TYPE line, and one sample line,
//! each terminated by `\n`. Labels are not used.

use std::fmt::Write;

use crate::metric::MetricKind;

/// `Content-Type` of a rendered body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Escape HELP text: `\` becomes `\\` and newline becomes `\n`.
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a float sample value.
///
/// Finite values use the shortest decimal that round-trips, so fractions are
/// kept (`21.5`) and whole numbers print without a trailing `.0` (`100`).
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// Append one metric (HELP, TYPE, sample) to `out`.
pub fn write_metric(out: &mut String, name: &str, help: &str, kind: MetricKind, value: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind.as_str());
    let _ = writeln!(out, "{} {}", name, value);
}

/// Append a gauge.
pub fn write_gauge(out: &mut String, name: &str, help: &str, v: f64) {
    write_metric(out, name, help, MetricKind::Gauge, &format_value(v));
}

/// Append a counter.
pub fn write_counter(out: &mut String, name: &str, help: &str, v: u64) {
    write_metric(out, name, help, MetricKind::Counter, &v.to_string());
}

//! Display formatting for computed values.

/// Format a number for display.
///
/// Whole numbers print without a fraction; everything else is rounded to two
/// decimals. Overflowed results print as spreadsheet-style markers.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

//! Display formatting for calculation results

/// Decimal separator used in displayed results.
pub const DECIMAL_SEPARATOR: char = ',';

/// Render `value` with one fractional digit and a comma separator.
///
/// Rounds half away from zero, no thousands grouping: `12.34` → `"12,3"`,
/// `1234.56` → `"1234,6"`.
pub fn format_decimal(value: f64) -> String {
    let mut rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        // drop the sign of -0.0
        rounded = 0.0;
    }
    format!("{:.1}", rounded).replace('.', &DECIMAL_SEPARATOR.to_string())
}

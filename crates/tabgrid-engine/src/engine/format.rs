//! Display formatting for computed results.

/// Round a computed result for display. The raw value keeps its fraction
/// through grid write-back; only the displayed text is rounded. With
/// `thousands` set the rounded integer is comma-grouped.
pub fn format_display(value: f64, thousands: bool) -> String {
    let rounded = value.round() as i64;
    if thousands {
        group_thousands(rounded)
    } else {
        rounded.to_string()
    }
}

/// Render an integer with comma-grouped thousands (1234567 -> "1,234,567").
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Build a tree node label from a name and an optional value.
pub fn node_label(label: &str, value: Option<&str>, delimiter: Option<&str>) -> String {
    match value {
        Some(value) => {
            let delimiter = match delimiter {
                Some(delimiter) => delimiter,
                None => ":",
            };
            format!("{}{} {}", label, delimiter, value)
        }
        None => label.to_string(),
    }
}

/// Format a millisecond sample for display.
pub fn format_millis(millis: f64) -> String {
    format!("{:.1} ms", millis)
}

//! Console formatting shared by the `footman` subcommands

const RULE_WIDTH: usize = 60;
const KEY_WIDTH: usize = 24;

/// Banner printed above each block of results.
pub fn section(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n{title}\n{rule}")
}

pub fn print_section(title: &str) {
    println!("{}", section(title));
}

/// Indented `key: value` line with the values aligned in one column.
pub fn kv_line(key: &str, value: &str) -> String {
    let key = format!("{key}:");
    format!("  {key:width$} {value}", width = KEY_WIDTH)
}

pub fn print_kv(key: &str, value: &str) {
    println!("{}", kv_line(key, value));
}

/// Episode counts with comma-grouped thousands.
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut groups: Vec<&str> = Vec::with_capacity(digits.len() / 3 + 1);
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.join(",")
}

/// A rate in `[0, 1]` as a one-decimal percentage.
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// One row of `footman weights show`.
pub fn weight_line(index: usize, feature: &str, weight: f64) -> String {
    kv_line(&format!("w{index} {feature}"), &format!("{weight:+.6}"))
}

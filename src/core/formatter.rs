use chrono::NaiveDate;

/// Returns "{used}% used", one decimal place, never below zero.
pub fn format_usage_percent(used_percent: f64) -> String {
    format!("{:.1}% used", used_percent.max(0.0))
}

/// Returns "[████████░░░░]" where █ = remaining portion, ░ = used portion.
/// Width is the number of block characters inside the brackets.
pub fn format_usage_bar(used_percent: f64, width: usize) -> String {
    let used_percent = used_percent.clamp(0.0, 100.0);
    let used_blocks = ((used_percent / 100.0) * width as f64).round() as usize;
    let remaining_blocks = width.saturating_sub(used_blocks);

    let filled: String = "█".repeat(remaining_blocks);
    let empty: String = "░".repeat(used_blocks);

    format!("[{}{}]", filled, empty)
}

/// Returns "$123.45".
pub fn format_dollars(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}

/// Credit counts with thousands separators: 20000 -> "20,000".
pub fn format_credits(count: i64) -> String {
    let digits = count.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if count < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Returns "Resets Nov 1 (in 13 days)" relative to `today`.
pub fn format_reset_date(reset: NaiveDate, today: NaiveDate) -> String {
    let days = (reset - today).num_days();
    let when = reset.format("%b %-d");
    match days {
        d if d <= 0 => format!("Resets {} (today)", when),
        1 => format!("Resets {} (tomorrow)", when),
        d => format!("Resets {} (in {} days)", when, d),
    }
}

/// Returns "Oct 1 - Oct 31".
pub fn format_period(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%b %-d"), end.format("%b %-d"))
}

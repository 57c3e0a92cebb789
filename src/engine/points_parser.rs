use std::sync::LazyLock;

use regex::Regex;

static DEDUCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:deduct|minus|lose|take away|remove|-)\s*([0-9]+)\s*(?:points|house points)")
        .expect("invalid deduction regex")
});

static AWARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:award|gain|get|plus|\+)\s*([0-9]+)\s*(?:points|house points)")
        .expect("invalid award regex")
});

static GENERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:points|house points)").expect("invalid generic points regex")
});

/// Extracts the house-point change a model reply announces.
///
/// Deductions and awards are summed over every match. Only when that signed
/// sum is exactly zero are bare "N points" mentions counted, all as positive.
/// A reply whose award and deduction cancel out therefore falls through to the
/// bare count as well.
pub fn parse_points_from_text(text: &str) -> i64 {
    let mut total: i64 = 0;

    for amount in captured_amounts(&DEDUCT_RE, text) {
        total = total.saturating_sub(amount);
    }
    for amount in captured_amounts(&AWARD_RE, text) {
        total = total.saturating_add(amount);
    }

    if total == 0 {
        for amount in captured_amounts(&GENERIC_RE, text) {
            total = total.saturating_add(amount);
        }
    }

    total
}

fn captured_amounts<'t>(re: &'t Regex, text: &'t str) -> impl Iterator<Item = i64> + 't {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| parse_amount(m.as_str()))
}

// Digit runs longer than i64 saturate.
fn parse_amount(digits: &str) -> i64 {
    digits.parse::<i64>().unwrap_or(i64::MAX)
}

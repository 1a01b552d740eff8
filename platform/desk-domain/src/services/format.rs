use serde::Serialize;

pub const CURRENCY_SYMBOL: &str = "₹";

/// Sign-based visual class for P/L style values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    /// Zero counts as positive; NaN does not.
    pub fn of(amount: f64) -> Self {
        if amount >= 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// en-IN currency with lakh/crore grouping and two fractional digits,
/// e.g. `1234567.5` -> `₹12,34,567.50`.
pub fn format_inr_grouped(amount: f64) -> String {
    match split_fixed(amount) {
        Some((negative, int_part, frac_part)) => format!(
            "{CURRENCY_SYMBOL}{}{}.{frac_part}",
            if negative { "-" } else { "" },
            group_indian(&int_part)
        ),
        None => format!("{CURRENCY_SYMBOL}{}", non_finite_label(amount, "∞")),
    }
}

/// Fixed two-decimal currency without grouping, e.g. `3500.0` -> `₹3500.00`.
pub fn format_inr_fixed(amount: f64) -> String {
    match split_fixed(amount) {
        Some((negative, int_part, frac_part)) => format!(
            "{CURRENCY_SYMBOL}{}{int_part}.{frac_part}",
            if negative { "-" } else { "" }
        ),
        None => format!("{CURRENCY_SYMBOL}{}", non_finite_label(amount, "Infinity")),
    }
}

fn non_finite_label(amount: f64, infinity: &str) -> String {
    if amount.is_nan() {
        "NaN".to_string()
    } else if amount.is_sign_negative() {
        format!("-{infinity}")
    } else {
        infinity.to_string()
    }
}

/// Rounds to 2 decimals, half away from zero, and splits into
/// (negative, integer digits, fraction digits). The sign is kept whenever the
/// input is below zero so the text agrees with [`Tone::of`].
fn split_fixed(amount: f64) -> Option<(bool, String, String)> {
    if !amount.is_finite() {
        return None;
    }
    let fixed = round_half_away(amount.abs());
    let (int_part, frac_part) = fixed.split_once('.')?;
    Some((amount < 0.0, int_part.to_string(), frac_part.to_string()))
}

/// `{:.2}` rounds exact ties to even. A two-decimal tie is only exact when
/// `abs * 8` is whole, and then `abs * 100` is exact too.
fn round_half_away(abs: f64) -> String {
    let scaled = abs * 100.0;
    if (abs * 8.0).fract() == 0.0 && scaled.fract() == 0.5 {
        let cents = format!("{:03.0}", scaled.round());
        let (int_part, frac_part) = cents.split_at(cents.len() - 2);
        return format!("{int_part}.{frac_part}");
    }
    format!("{abs:.2}")
}

/// Last three digits form a group, every two digits before that form another.
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

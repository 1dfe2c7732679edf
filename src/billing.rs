use crate::models::LineItem;

/// Reads a fee typed by the user.
///
/// Takes the longest leading decimal number (optional sign, digits, fraction,
/// exponent) after trimming whitespace, so `"12abc"` is 12. Anything without
/// digits, or a value that overflows to infinity, counts as 0.
pub fn parse_amount(text: &str) -> f64 {
    let s = text.trim();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start {
            digits += j - frac_start;
            end = j;
        }
    }

    if digits == 0 {
        return 0.0;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// The four charges of a row after the free / include flags are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeeBreakdown {
    pub consultation: f64,
    pub procedure: f64,
    pub tests: f64,
    pub additional: f64,
}

impl FeeBreakdown {
    pub fn of(item: &LineItem) -> Self {
        let gated = |include: bool, text: &str| if include { parse_amount(text) } else { 0.0 };

        Self {
            consultation: gated(!item.is_free, item.amount.as_str()),
            procedure: gated(item.include_procedure, item.procedure_fee.as_str()),
            tests: gated(item.include_lab, item.test_fee.as_str()),
            additional: gated(item.include_extra, item.extra_fee.as_str()),
        }
    }

    pub fn total(&self) -> f64 {
        self.consultation + self.procedure + self.tests + self.additional
    }
}

pub fn row_total(item: &LineItem) -> f64 {
    FeeBreakdown::of(item).total()
}

pub fn daily_total(rows: &[LineItem]) -> f64 {
    rows.iter().map(row_total).sum()
}

/// Shortest decimal form of an amount, without a trailing `.0`.
pub fn plain_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

/// Rupee amount rounded to whole rupees with Indian digit grouping,
/// e.g. `₹11,50,000`.
pub fn format_inr(n: f64) -> String {
    let rounded = if n.is_finite() { n.round() } else { 0.0 };
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (front, back) = rest.split_at(rest.len() - 2);
            groups.push(back);
            rest = front;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

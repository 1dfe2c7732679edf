//! English words for rupee amounts, grouped the South Asian way
//! (thousand, lakh, crore).

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

fn two_digits(n: u64) -> String {
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let tens = TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_string(),
        ones => format!("{} {}", tens, ONES[ones as usize]),
    }
}

fn three_digits(n: u64) -> String {
    let hundred = n / 100;
    let rest = n % 100;
    match (hundred, rest) {
        (0, _) => two_digits(rest),
        (_, 0) => format!("{} Hundred", ONES[hundred as usize]),
        _ => format!("{} Hundred {}", ONES[hundred as usize], two_digits(rest)),
    }
}

/// Words for a positive integer. Counts of crores above 999 are spelled
/// recursively ("One Thousand Crore").
fn integer_words(n: u64) -> String {
    let crore = n / CRORE;
    let lakh = (n % CRORE) / LAKH;
    let thousand = (n % LAKH) / THOUSAND;
    let rest = n % THOUSAND;

    let mut parts = Vec::new();
    if crore > 0 {
        let count = if crore > 999 { integer_words(crore) } else { three_digits(crore) };
        parts.push(format!("{} Crore", count));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", two_digits(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", two_digits(thousand)));
    }
    if rest > 0 {
        parts.push(three_digits(rest));
    }
    parts.join(" ")
}

/// `"Rupees Eleven Lakh Fifty Thousand Only"` for 1150000.
///
/// The amount is rounded to paise first, so 1.999 reads as two rupees.
/// Negative and non-finite amounts read as zero.
pub fn amount_in_words(amount: f64) -> String {
    let total_paise = if amount.is_finite() && amount > 0.0 {
        (amount * 100.0).round() as u64
    } else {
        0
    };
    let rupees = total_paise / 100;
    let paise = total_paise % 100;

    let mut words = if rupees == 0 {
        "Zero Rupees".to_string()
    } else {
        format!("Rupees {}", integer_words(rupees))
    };
    if paise > 0 {
        words.push_str(&format!(" and {} Paise", two_digits(paise)));
    }
    words.push_str(" Only");
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lakh_and_thousand() {
        assert_eq!(amount_in_words(1150000.0), "Rupees Eleven Lakh Fifty Thousand Only");
    }

    #[test]
    fn zero_and_paise_only() {
        assert_eq!(amount_in_words(0.0), "Zero Rupees Only");
        assert_eq!(amount_in_words(0.5), "Zero Rupees and Fifty Paise Only");
    }

    #[test]
    fn small_amounts() {
        assert_eq!(amount_in_words(7.0), "Rupees Seven Only");
        assert_eq!(amount_in_words(19.0), "Rupees Nineteen Only");
        assert_eq!(amount_in_words(40.0), "Rupees Forty Only");
        assert_eq!(amount_in_words(700.0), "Rupees Seven Hundred Only");
        assert_eq!(amount_in_words(1500.0), "Rupees One Thousand Five Hundred Only");
    }

    #[test]
    fn crore_with_every_group() {
        assert_eq!(
            amount_in_words(123456789.0),
            "Rupees Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine Only"
        );
    }

    #[test]
    fn rupees_and_paise() {
        assert_eq!(amount_in_words(250.75), "Rupees Two Hundred Fifty and Seventy Five Paise Only");
        assert_eq!(amount_in_words(1.999), "Rupees Two Only");
    }

    #[test]
    fn very_large_crore_counts() {
        assert_eq!(amount_in_words(10_000_000_000.0), "Rupees One Thousand Crore Only");
    }

    #[test]
    fn negative_and_nan_read_as_zero() {
        assert_eq!(amount_in_words(-5.0), "Zero Rupees Only");
        assert_eq!(amount_in_words(f64::NAN), "Zero Rupees Only");
    }
}

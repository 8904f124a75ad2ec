/// 1 crore = 10,000,000 rupees.
pub const CRORE: f64 = 10_000_000.0;
/// 1 lakh = 100,000 rupees.
pub const LAKH: f64 = 100_000.0;

/// Format a rupee amount the way the results panel shows it:
/// crores with two decimals, else lakhs with two decimals, else a rounded
/// integer with Indian digit grouping. Zero and non-finite amounts render as `₹0`.
pub fn format_inr(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "₹0".to_string();
    }

    let crores = amount / CRORE;
    let lakhs = amount / LAKH;
    if crores >= 1.0 {
        format!("₹{crores:.2} Cr")
    } else if lakhs >= 1.0 {
        format!("₹{lakhs:.2} L")
    } else {
        format!("₹{}", group_indian(amount.round() as i64))
    }
}

/// Indian digit grouping: the last three digits, then pairs (12,34,567).
pub fn group_indian(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2 + 1);
    if value < 0 {
        out.push('-');
    }

    if digits.len() <= 3 {
        out.push_str(&digits);
        return out;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let lead = head.len() % 2;
    if lead > 0 {
        out.push_str(&head[..lead]);
    }
    for (i, pair) in head.as_bytes()[lead..].chunks(2).enumerate() {
        if i > 0 || lead > 0 {
            out.push(',');
        }
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    out.push(',');
    out.push_str(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::{format_inr, group_indian};

    #[test]
    fn formats_crores() {
        assert_eq!(format_inr(15_000_000.0), "₹1.50 Cr");
        assert_eq!(format_inr(150_000_000.0), "₹15.00 Cr");
    }

    #[test]
    fn formats_lakhs() {
        assert_eq!(format_inr(250_000.0), "₹2.50 L");
        assert_eq!(format_inr(2_500_000.0), "₹25.00 L");
        assert_eq!(format_inr(9_999_999.0), "₹100.00 L");
    }

    #[test]
    fn formats_small_amounts_with_grouping() {
        assert_eq!(format_inr(50_000.0), "₹50,000");
        assert_eq!(format_inr(999.4), "₹999");
        assert_eq!(format_inr(99_999.6), "₹1,00,000");
    }

    #[test]
    fn formats_zero_and_garbage() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(f64::NAN), "₹0");
    }

    #[test]
    fn negative_amounts_fall_through_to_grouping() {
        assert_eq!(format_inr(-5_000.0), "₹-5,000");
    }

    #[test]
    fn groups_in_indian_style() {
        assert_eq!(group_indian(0), "0");
        assert_eq!(group_indian(1_000), "1,000");
        assert_eq!(group_indian(12_34_567), "12,34,567");
        assert_eq!(group_indian(1_23_45_678), "1,23,45,678");
        assert_eq!(group_indian(-25_00_000), "-25,00,000");
    }
}

use std::fmt::Write;

/// Format an inference duration for the results panel ("12.35 ms").
pub fn format_inference_ms(ms: f64) -> String {
    let mut out = String::with_capacity(10);
    write_inference_ms(&mut out, ms);
    out
}

pub fn write_inference_ms(buf: &mut String, ms: f64) {
    buf.clear();
    let ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
    let _ = write!(buf, "{ms:.2} ms");
}

#[cfg(test)]
mod tests {
    use super::format_inference_ms;

    #[test]
    fn formats_zero() {
        assert_eq!(format_inference_ms(0.0), "0.00 ms");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(format_inference_ms(12.345_6), "12.35 ms");
    }

    #[test]
    fn pads_whole_numbers() {
        assert_eq!(format_inference_ms(7.0), "7.00 ms");
    }

    #[test]
    fn clamps_negative_and_nan() {
        assert_eq!(format_inference_ms(-3.0), "0.00 ms");
        assert_eq!(format_inference_ms(f64::NAN), "0.00 ms");
    }
}

//! Color scales and number formatting shared by the interactive and static charts.

/// Sequential "Blues" ramp (ColorBrewer), as `(position, rgb)` stops.
const BLUES: [(f64, [u8; 3]); 9] = [
    (0.0, [247, 251, 255]),
    (0.125, [222, 235, 247]),
    (0.25, [198, 219, 239]),
    (0.375, [158, 202, 225]),
    (0.5, [107, 174, 214]),
    (0.625, [66, 146, 198]),
    (0.75, [33, 113, 181]),
    (0.875, [8, 81, 156]),
    (1.0, [8, 48, 107]),
];

/// Qualitative palette for pie slices, cycled when there are more slices.
pub const PALETTE: [[u8; 3]; 10] = [
    [99, 110, 250],  // Blue
    [239, 85, 59],   // Red
    [0, 204, 150],   // Green
    [171, 99, 250],  // Purple
    [255, 161, 90],  // Orange
    [25, 211, 243],  // Cyan
    [255, 102, 146], // Pink
    [182, 232, 128], // Light Green
    [255, 151, 255], // Magenta
    [254, 203, 82],  // Yellow
];

/// Color at `t` in [0, 1] on the Blues ramp, linearly interpolated.
pub fn blues(t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    for pair in BLUES.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])];
        }
    }
    BLUES[BLUES.len() - 1].1
}

/// Position of `value` within `[min, max]`; 1.0 when the range is flat.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

pub fn palette_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// Whole amount with thousands separators, e.g. `1,234,567 DH`.
///
/// Halves round to even; negative amounts that round to zero keep their sign.
pub fn format_currency(value: f64, suffix: &str) -> String {
    let rounded = value.round_ties_even();
    let grouped = group_thousands(&format!("{:.0}", rounded.abs()));
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    if suffix.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{} {}", sign, grouped, suffix)
    }
}

/// Indicator value as displayed in tables and tooltips: grouped, at most two decimals.
pub fn format_value(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    if frac == "00" {
        format!("{}{}", sign, group_thousands(whole))
    } else {
        format!("{}{}.{}", sign, group_thousands(whole), frac)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blues_endpoints_and_midpoint() {
        assert_eq!(blues(0.0), [247, 251, 255]);
        assert_eq!(blues(1.0), [8, 48, 107]);
        assert_eq!(blues(0.5), [107, 174, 214]);
        assert_eq!(blues(-3.0), blues(0.0));
        assert_eq!(blues(f64::NAN), blues(0.0));
    }

    #[test]
    fn blues_darkens_monotonically() {
        let lightness = |c: [u8; 3]| c.iter().map(|&v| v as u32).sum::<u32>();
        let samples: Vec<u32> = (0..=20).map(|i| lightness(blues(i as f64 / 20.0))).collect();
        assert!(samples.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn normalize_handles_flat_ranges() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(3.0, 3.0, 3.0), 1.0);
    }

    #[test]
    fn currency_has_thousands_separators() {
        assert_eq!(format_currency(0.0, "DH"), "0 DH");
        assert_eq!(format_currency(150.0, "DH"), "150 DH");
        assert_eq!(format_currency(1234.0, "DH"), "1,234 DH");
        assert_eq!(format_currency(1234567.4, "DH"), "1,234,567 DH");
        assert_eq!(format_currency(999999.5, "DH"), "1,000,000 DH");
        assert_eq!(format_currency(-12345.0, "DH"), "-12,345 DH");
    }

    #[test]
    fn currency_halves_round_to_even() {
        assert_eq!(format_currency(2.5, "DH"), "2 DH");
        assert_eq!(format_currency(3.5, "DH"), "4 DH");
        assert_eq!(format_currency(1234.5, "DH"), "1,234 DH");
        assert_eq!(format_currency(-2.5, "DH"), "-2 DH");
        assert_eq!(format_currency(-0.2, "DH"), "-0 DH");
        assert_eq!(format_currency(0.2, ""), "0");
    }

    #[test]
    fn values_keep_two_decimals() {
        assert_eq!(format_value(1500.0), "1,500");
        assert_eq!(format_value(1500.25), "1,500.25");
        assert_eq!(format_value(-0.5), "-0.50");
        assert_eq!(format_value(1500.999), "1,501");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(200.0 / 3.0), "66.7%");
        assert_eq!(format_percent(100.0 / 3.0), "33.3%");
    }
}

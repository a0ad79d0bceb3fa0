/// Placeholder shown when a delta is absent.
pub const ABSENT: &str = "—";

/// `12345678.0` → `"12.3 M"`.
pub fn millions(value: f64) -> String {
    format!("{:.1} M", value / 1_000_000.0)
}

/// Signed change in thousands with digit grouping, e.g. `"+1,234 K"`.
pub fn delta_thousands(delta: Option<f64>) -> String {
    match delta {
        None => ABSENT.to_string(),
        Some(d) => {
            let k = (d / 1_000.0).round();
            let sign = if k < 0.0 { '-' } else { '+' };
            format!("{sign}{} K", group_digits(k.abs() as u64))
        }
    }
}

/// Whole number with thousands separators, e.g. `"39,512,223"`.
pub fn population(value: f64) -> String {
    let rounded = value.round();
    let digits = group_digits(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-{digits}")
    } else {
        digits
    }
}

fn group_digits(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

//! Writes a synthetic wide-format population file:
//! `states,id,2010,...,2019`, populations with thousands separators.

use anyhow::{Context, Result};

/// (name, id, 2010 population in thousands)
const STATES: [(&str, u32, f64); 51] = [
    ("Alabama", 1, 4785.0),
    ("Alaska", 2, 714.0),
    ("Arizona", 4, 6408.0),
    ("Arkansas", 5, 2922.0),
    ("California", 6, 37320.0),
    ("Colorado", 8, 5048.0),
    ("Connecticut", 9, 3580.0),
    ("Delaware", 10, 899.0),
    ("District of Columbia", 11, 605.0),
    ("Florida", 12, 18846.0),
    ("Georgia", 13, 9712.0),
    ("Hawaii", 15, 1364.0),
    ("Idaho", 16, 1571.0),
    ("Illinois", 17, 12841.0),
    ("Indiana", 18, 6490.0),
    ("Iowa", 19, 3050.0),
    ("Kansas", 20, 2858.0),
    ("Kentucky", 21, 4348.0),
    ("Louisiana", 22, 4544.0),
    ("Maine", 23, 1327.0),
    ("Maryland", 24, 5788.0),
    ("Massachusetts", 25, 6566.0),
    ("Michigan", 26, 9877.0),
    ("Minnesota", 27, 5311.0),
    ("Mississippi", 28, 2970.0),
    ("Missouri", 29, 5996.0),
    ("Montana", 30, 990.0),
    ("Nebraska", 31, 1830.0),
    ("Nevada", 32, 2703.0),
    ("New Hampshire", 33, 1316.0),
    ("New Jersey", 34, 8799.0),
    ("New Mexico", 35, 2064.0),
    ("New York", 36, 19400.0),
    ("North Carolina", 37, 9574.0),
    ("North Dakota", 38, 674.0),
    ("Ohio", 39, 11539.0),
    ("Oklahoma", 40, 3760.0),
    ("Oregon", 41, 3837.0),
    ("Pennsylvania", 42, 12712.0),
    ("Rhode Island", 44, 1053.0),
    ("South Carolina", 45, 4635.0),
    ("South Dakota", 46, 816.0),
    ("Tennessee", 47, 6356.0),
    ("Texas", 48, 25241.0),
    ("Utah", 49, 2775.0),
    ("Vermont", 50, 626.0),
    ("Virginia", 51, 8024.0),
    ("Washington", 53, 6742.0),
    ("West Virginia", 54, 1854.0),
    ("Wisconsin", 55, 5690.0),
    ("Wyoming", 56, 564.0),
];

const FIRST_YEAR: i32 = 2010;
const LAST_YEAR: i32 = 2019;

/// Seeded splitmix64 stream; the same seed always yields the same file.
struct Jitter(u64);

impl Jitter {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[lo, hi)`.
    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 * f64::EPSILON / 2.0;
        lo + (hi - lo) * unit
    }
}

/// `1234567` → `"1,234,567"`.
fn with_separators(n: u64) -> String {
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

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "us-population-2010-2019.csv".to_string());
    let mut rng = Jitter(42);

    let mut wtr = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec!["states".to_string(), "id".to_string()];
    header.extend((FIRST_YEAR..=LAST_YEAR).map(|y| y.to_string()));
    wtr.write_record(&header)?;

    for (name, id, base_thousands) in STATES {
        // Yearly growth between -0.6 % and +2.0 %, fixed per state.
        let growth = rng.between(-0.006, 0.02);
        let mut population = base_thousands * 1000.0;

        let mut row = vec![name.to_string(), id.to_string()];
        for _ in FIRST_YEAR..=LAST_YEAR {
            let noise = rng.between(-0.002, 0.002);
            row.push(with_separators(population.round() as u64));
            population *= 1.0 + growth + noise;
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;

    println!(
        "Wrote {} states ({FIRST_YEAR}–{LAST_YEAR}) to {output_path}",
        STATES.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_group_by_thousands() {
        assert_eq!(with_separators(0), "0");
        assert_eq!(with_separators(999), "999");
        assert_eq!(with_separators(1_000), "1,000");
        assert_eq!(with_separators(37_320_000), "37,320,000");
    }

    #[test]
    fn jitter_is_seeded_and_bounded() {
        let mut a = Jitter(42);
        let mut b = Jitter(42);
        for _ in 0..1000 {
            let x = a.between(-0.006, 0.02);
            assert_eq!(x, b.between(-0.006, 0.02));
            assert!((-0.006..0.02).contains(&x));
        }
    }
}

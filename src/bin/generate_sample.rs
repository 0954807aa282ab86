use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use energy_dash::data::catalog::{Catalog, DatasetKey, DatasetSpec};

/// Minimal deterministic PRNG (xoshiro256**), seeded so every run writes the
/// same sample files.
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Column names written for each page. Demand and Open Access match the
/// built-in catalog's series; the other pages plot whatever they find.
fn columns(key: DatasetKey) -> [&'static str; 2] {
    match key {
        DatasetKey::Demand => ["Demand(Actual)", "Demand(Pred)"],
        DatasetKey::OpenAccess => ["Actual", "Pred"],
        DatasetKey::Price => ["Price(Actual)", "Price(Pred)"],
        DatasetKey::Solar => ["Solar(Actual)", "Solar(Pred)"],
        DatasetKey::Wind => ["Wind(Actual)", "Wind(Pred)"],
    }
}

/// Noise-free value of a dataset at a given instant.
fn profile(key: DatasetKey, ts: NaiveDateTime, rng: &mut SimpleRng) -> f64 {
    let hour = ts.hour() as f64 + ts.minute() as f64 / 60.0;
    let daily = (2.0 * PI * (hour - 14.0) / 24.0).cos();
    match key {
        DatasetKey::Demand => 16_000.0 + 2_500.0 * daily,
        DatasetKey::OpenAccess => 1_800.0 + 300.0 * daily,
        DatasetKey::Price => (4.0 + 1.5 * daily).max(0.5),
        DatasetKey::Solar => {
            if (6.0..18.0).contains(&hour) {
                4_000.0 * (PI * (hour - 6.0) / 12.0).sin()
            } else {
                0.0
            }
        }
        DatasetKey::Wind => (2_000.0 + rng.gauss(0.0, 600.0)).max(0.0),
    }
}

fn write_dataset(
    spec: &DatasetSpec,
    dir: &std::path::Path,
    start: NaiveDateTime,
    end: NaiveDateTime,
    rng: &mut SimpleRng,
) -> Result<usize> {
    let path = spec.path(dir);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    let [actual_col, pred_col] = columns(spec.key);
    writer.write_record([spec.timestamp_column.as_str(), actual_col, pred_col])?;

    let step = TimeDelta::minutes(15);
    let mut ts = start;
    let mut rows = 0;
    while ts < end {
        // ~2% of readings go missing, a few arrive a couple of minutes late
        let skip = rng.next_f64() < 0.02;
        if !skip {
            let jitter = if rng.next_f64() < 0.05 {
                TimeDelta::minutes(2)
            } else {
                TimeDelta::zero()
            };
            let at = ts + jitter;
            let actual = profile(spec.key, at, rng);
            let scale = actual.abs().max(1.0) * 0.04;
            let predicted = actual + rng.gauss(0.0, scale);
            let stamp = at.format(spec.timestamp_format.pattern()).to_string();
            // the odd blank prediction
            let pred_cell = if rng.next_f64() < 0.01 {
                String::new()
            } else {
                format!("{predicted:.2}")
            };
            writer.write_record([stamp, format!("{actual:.2}"), pred_cell])?;
            rows += 1;
        }
        ts += step;
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Data"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2023, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid end date")?;

    for spec in &Catalog::builtin().datasets {
        let rows = write_dataset(spec, &dir, start, end, &mut rng)?;
        println!("Wrote {rows} rows to {}", spec.path(&dir).display());
    }
    Ok(())
}

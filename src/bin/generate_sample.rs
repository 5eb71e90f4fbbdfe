//! Writes a deterministic long-form sample (`country,gdp,year`) as CSV,
//! suitable for trying out `rusty-frames <file> pivot year country gdp`.

use std::io::Write;

use anyhow::{Context, Result};
use rusty_frames::data::loader::write_csv;
use rusty_frames::{ColumnSet, Dataset, Datatype, Vector, vector};

/// Minimal deterministic PRNG (xoshiro256**)
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

    /// Uniform in `[-spread, spread)`.
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * spread
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    // (country, base gdp, yearly growth)
    let countries = [
        ("us", 10_000.0, 0.025),
        ("uk", 1_600.0, 0.018),
        ("fr", 1_400.0, 0.015),
        ("de", 2_000.0, 0.014),
        ("jp", 4_800.0, 0.008),
    ];
    let years = 2000..2020;

    let mut rows: Vec<Vector> = Vec::new();
    for &(country, base, growth) in &countries {
        let mut gdp: f64 = base;
        for year in years.clone() {
            // a few gaps, so the pivoted output has missing cells
            if rng.next_f64() < 0.05 {
                continue;
            }
            gdp *= 1.0 + growth + rng.jitter(0.01);
            rows.push(vector![country, (gdp * 10.0).round() / 10.0, year]);
        }
    }

    let dataset = Dataset::new(
        ColumnSet::of(&[
            ("country", Datatype::String),
            ("gdp", Datatype::Numeric),
            ("year", Datatype::Numeric),
        ])?,
        rows,
    )?;

    match std::env::args().nth(1) {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating {path}"))?;
            write_csv(&dataset, file)?;
            eprintln!("Wrote {} rows to {path}", dataset.len());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_csv(&dataset, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

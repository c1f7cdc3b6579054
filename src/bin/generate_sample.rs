use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

#[derive(Debug, Serialize)]
struct CostRecord {
    id: i64,
    invoice: String,
    provider: String,
    service: String,
    /// Left blank now and then, like real billing exports.
    cost: Option<f64>,
    date: NaiveDate,
}

fn generate(days: i64) -> Vec<CostRecord> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();

    let providers = [("AWS", 120.0), ("Azure", 80.0), ("GCP", 60.0)];
    let services = ["Compute", "Storage", "Network", "Database"];

    let mut records = Vec::new();
    for day in 0..days {
        let date = start + Duration::days(day);
        for &(provider, base) in &providers {
            let id = records.len() as i64 + 1;
            let cost = if rng.next_f64() < 0.05 {
                None
            } else {
                let c = rng.gauss(base, base * 0.25).max(0.0);
                Some((c * 100.0).round() / 100.0)
            };
            records.push(CostRecord {
                id,
                invoice: format!("INV-{id:05}"),
                provider: provider.to_string(),
                service: rng.pick(&services).to_string(),
                cost,
                date,
            });
        }
    }
    records
}

fn write_csv(path: &PathBuf, records: &[CostRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for rec in records {
        writer.serialize(rec).context("writing CSV record")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &PathBuf, records: &[CostRecord]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("invoice", DataType::Utf8, false),
        Field::new("provider", DataType::Utf8, false),
        Field::new("service", DataType::Utf8, false),
        Field::new("cost", DataType::Float64, true),
        Field::new("date", DataType::Date32, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.id))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.invoice))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.provider))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.service))),
            Arc::new(Float64Array::from(
                records.iter().map(|r| r.cost).collect::<Vec<_>>(),
            )),
            Arc::new(Date32Array::from_iter_values(
                records
                    .iter()
                    .map(|r| (r.date - epoch).num_days() as i32),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let csv_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_costs.csv"));
    let parquet_path = csv_path.with_extension("parquet");

    let records = generate(90);
    write_csv(&csv_path, &records)?;
    write_parquet(&parquet_path, &records)?;

    println!(
        "Wrote {} cost records to {} and {}",
        records.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

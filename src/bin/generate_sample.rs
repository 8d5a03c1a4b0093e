use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }
}

/// Category name and unit price range in KSh.
const CATEGORIES: [(&str, f64, f64); 5] = [
    ("Electronics", 2500.0, 45000.0),
    ("Grocery", 50.0, 900.0),
    ("Clothing", 400.0, 6000.0),
    ("Home & Kitchen", 300.0, 12000.0),
    ("Beauty", 150.0, 3500.0),
];
const CTYPES: [&str; 2] = ["Member", "Normal"];
const PAYMENTS: [&str; 4] = ["Cash", "Card", "M-Pesa", "Bank Transfer"];
const GENDERS: [&str; 2] = ["Female", "Male"];

struct Row {
    date: String,
    category: &'static str,
    ctype: &'static str,
    paym: &'static str,
    discapld: &'static str,
    cgender: &'static str,
    saleslevel: &'static str,
    totalsales: f64,
    unitsold: i64,
}

fn sales_level(total: f64) -> &'static str {
    match total {
        t if t < 2000.0 => "Low",
        t if t < 20000.0 => "Medium",
        _ => "High",
    }
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    (0..n)
        .map(|i| {
            let day = start + Duration::days(rng.range(0, 729) as i64);
            // A few hand-typed dates that will not parse.
            let date = if i % 499 == 17 {
                "31-31-2024".to_string()
            } else {
                day.format("%d/%m/%Y").to_string()
            };

            let (category, lo, hi) = CATEGORIES[(rng.next_u64() % CATEGORIES.len() as u64) as usize];
            let unitsold = rng.range(1, 10) as i64;
            let price = lo + (hi - lo) * rng.next_f64();
            let discounted = rng.next_f64() < 0.35;
            let factor = if discounted { 0.85 } else { 1.0 };
            let totalsales = (price * unitsold as f64 * factor * 100.0).round() / 100.0;

            Row {
                date,
                category,
                ctype: rng.pick(&CTYPES),
                paym: rng.pick(&PAYMENTS),
                discapld: if discounted { "Yes" } else { "No" },
                cgender: rng.pick(&GENDERS),
                saleslevel: sales_level(totalsales),
                totalsales,
                unitsold,
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "date", "category", "ctype", "paym", "discapld", "cgender", "saleslevel", "totalsales",
        "unitsold",
    ])?;
    for r in rows {
        writer.write_record([
            r.date.as_str(),
            r.category,
            r.ctype,
            r.paym,
            r.discapld,
            r.cgender,
            r.saleslevel,
            r.totalsales.to_string().as_str(),
            r.unitsold.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let text = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("ctype", DataType::Utf8, false),
        Field::new("paym", DataType::Utf8, false),
        Field::new("discapld", DataType::Utf8, false),
        Field::new("cgender", DataType::Utf8, false),
        Field::new("saleslevel", DataType::Utf8, false),
        Field::new("totalsales", DataType::Float64, false),
        Field::new("unitsold", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.date.as_str())),
            Arc::new(text(|r| r.category)),
            Arc::new(text(|r| r.ctype)),
            Arc::new(text(|r| r.paym)),
            Arc::new(text(|r| r.discapld)),
            Arc::new(text(|r| r.cgender)),
            Arc::new(text(|r| r.saleslevel)),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.totalsales).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.unitsold).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 2500);

    let csv_path = "NeluxTech Proprietary Retail Dataset.csv";
    let parquet_path = "sample_sales.parquet";
    write_csv(&rows, csv_path)?;
    write_parquet(&rows, parquet_path)?;

    println!(
        "Wrote {} transactions to '{csv_path}' and '{parquet_path}'",
        rows.len()
    );
    Ok(())
}

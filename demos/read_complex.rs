//! Complex Number and Datetime Examples
//!
//! Demonstrates the wider field types:
//! - Complex numbers written as `a+bj`, `bj` or plain reals
//! - Datetimes converted to microseconds since the Unix epoch
//! - Whitespace-separated columns

use std::error::Error;
use std::fs::File;

use textreader::{read_all, ReadOptions};

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Complex and Datetime Examples ===\n");

    // Example 1: Complex columns
    println!("1. Reading complex numbers...");
    {
        let path = std::env::temp_dir().join("textreader_demo_complex.txt");
        std::fs::write(&path, "  1.0-2.0j  3+4j\n  0.5  6.0+0j\n  -1.5e1  2.5j\n")?;

        let file = File::open(&path)?;
        let options = ReadOptions::default().whitespace_delimited();
        let buffer = read_all(&file, "2z", &options)?;

        for row in buffer.as_bytes().chunks_exact(32) {
            let values: Vec<f64> = row
                .chunks_exact(8)
                .map(|c| c.try_into().map(f64::from_ne_bytes))
                .collect::<Result<_, _>>()?;
            println!(
                "   ({} {:+}j) ({} {:+}j)",
                values[0], values[1], values[2], values[3]
            );
        }
        std::fs::remove_file(&path)?;
    }

    // Example 2: Datetime column with a UTC offset
    println!("\n2. Reading datetimes...");
    {
        let path = std::env::temp_dir().join("textreader_demo_dates.csv");
        std::fs::write(
            &path,
            "2011-01-02 00:30,1\n2011-01-02 06:15,2\nmissing,3\n",
        )?;

        let file = File::open(&path)?;
        let options = ReadOptions::default()
            .datetime_format("%Y-%m-%d %H:%M")
            .tz_offset_seconds(3600);
        let buffer = read_all(&file, "UB", &options)?;

        for i in 0..buffer.rows() {
            if let Some(row) = buffer.row(i) {
                let micros = i64::from_ne_bytes(row[0..8].try_into()?);
                let when = chrono::DateTime::from_timestamp_micros(micros)
                    .map(|dt| dt.to_string())
                    .unwrap_or_else(|| "invalid".to_string());
                println!("   tag={} micros={} utc={}", row[8], micros, when);
            }
        }
        std::fs::remove_file(&path)?;
    }

    println!("\n=== All examples completed ===");
    Ok(())
}

//! Row Decoding Examples
//!
//! Demonstrates decoding delimited text into typed binary rows:
//! - Mixed integer and float layouts
//! - Column selection with negative indices
//! - Comments, skipped rows and locale-specific numbers
//! - Consecutive reads from the same file

use std::error::Error;
use std::fs::File;
use std::io::Write;

use textreader::{count_rows, read_all, read_rows, FieldTypeLayout, ReadOptions};

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Row Decoding Examples ===\n");

    let path = std::env::temp_dir().join("textreader_demo_rows.csv");
    {
        let mut out = File::create(&path)?;
        writeln!(out, "# station readings")?;
        writeln!(out, "id,count,temperature,label")?;
        for i in 0..10 {
            writeln!(out, "{},{},{:.2},\"site {}\"", i, i * 3, 20.0 + i as f64 / 4.0, i)?;
        }
    }

    // Example 1: Count rows
    println!("1. Counting rows...");
    {
        let file = File::open(&path)?;
        let options = ReadOptions::default().comment(b'#');
        println!("   Rows (including header): {}", count_rows(&file, &options)?);
    }

    // Example 2: Decode into a caller-provided buffer
    println!("\n2. Decoding \"2i1d\" into a fixed buffer...");
    {
        let file = File::open(&path)?;
        let options = ReadOptions::default().comment(b'#').skip_rows(1);
        let layout = FieldTypeLayout::parse("2i1d")?;
        let mut dest = vec![0u8; layout.stride() * 4];

        let rows = read_rows(&file, "2i1d", &options, &mut dest)?;
        for row in dest.chunks_exact(layout.stride()).take(rows) {
            let id = i32::from_ne_bytes(row[0..4].try_into()?);
            let count = i32::from_ne_bytes(row[4..8].try_into()?);
            let temperature = f64::from_ne_bytes(row[8..16].try_into()?);
            println!("   id={} count={} temperature={}", id, count, temperature);
        }
    }

    // Example 3: Select columns from the end of the row
    println!("\n3. Selecting columns (0, -1)...");
    {
        let file = File::open(&path)?;
        let options = ReadOptions::default()
            .comment(b'#')
            .skip_rows(1)
            .usecols(vec![0, -1]);
        let buffer = read_all(&file, "H8s", &options)?;

        println!("   Decoded {} rows", buffer.rows());
        for i in 0..3 {
            if let Some(row) = buffer.row(i) {
                let id = u16::from_ne_bytes(row[0..2].try_into()?);
                let label = String::from_utf8_lossy(&row[2..]);
                println!("   {} -> {:?}", id, label.trim_end_matches('\0'));
            }
        }
    }

    // Example 4: Continue reading where the previous call stopped
    println!("\n4. Reading in chunks...");
    {
        let file = File::open(&path)?;
        let options = ReadOptions::default()
            .comment(b'#')
            .skip_rows(1)
            .usecols(vec![0]);
        let mut chunk = vec![0u8; 4];
        let first = read_rows(&file, "B", &options, &mut chunk)?;
        println!("   First chunk: {} rows {:?}", first, &chunk[..first]);

        let options = ReadOptions::default().usecols(vec![0]);
        let second = read_rows(&file, "B", &options, &mut chunk)?;
        println!("   Second chunk: {} rows {:?}", second, &chunk[..second]);
    }

    // Example 5: Semicolon-separated file with decimal commas
    println!("\n5. Locale-specific numbers...");
    {
        let locale_path = std::env::temp_dir().join("textreader_demo_locale.csv");
        std::fs::write(&locale_path, "1,5D2;-0,25\n3,0;4,75D-1\n")?;

        let file = File::open(&locale_path)?;
        let options = ReadOptions::default()
            .delimiter(b';')
            .decimal(b',')
            .exponent(b'D');
        let buffer = read_all(&file, "2d", &options)?;
        for row in buffer.as_bytes().chunks_exact(16) {
            let a = f64::from_ne_bytes(row[0..8].try_into()?);
            let b = f64::from_ne_bytes(row[8..16].try_into()?);
            println!("   {} {}", a, b);
        }
        std::fs::remove_file(&locale_path)?;
    }

    std::fs::remove_file(&path)?;
    println!("\n=== All examples completed ===");
    Ok(())
}

//! Integration tests for textreader

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use tempfile::NamedTempFile;
use textreader::{
    count_fields, count_rows, read_all, read_rows, FieldTypeLayout, ReadOptions, TextError,
};

fn temp_with(text: &str) -> NamedTempFile {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(text.as_bytes()).unwrap();
    temp.flush().unwrap();
    temp
}

fn decode_file(file: &File, format: &str, options: &ReadOptions, rows: usize) -> (usize, Vec<u8>) {
    let stride = FieldTypeLayout::parse(format).unwrap().stride();
    let mut dest = vec![0u8; stride * rows];
    let written = read_rows(file, format, options, &mut dest).unwrap();
    (written, dest)
}

fn f64s(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

fn fixed_and_scientific(values: &[f64], delimiter: char) -> Vec<String> {
    let join = |cells: Vec<String>| cells.join(&delimiter.to_string());
    values
        .chunks(2)
        .map(|pair| {
            [
                join(pair.iter().map(|v| format!("{:.18e}", v)).collect()),
                join(pair.iter().map(|v| format!("{:.2}", v)).collect()),
                join(pair.iter().map(|v| format!("{}", v)).collect()),
            ]
        })
        .fold(vec![String::new(); 3], |mut acc, lines| {
            for (text, line) in acc.iter_mut().zip(lines) {
                text.push_str(&line);
                text.push('\n');
            }
            acc
        })
}

#[test]
fn test_float_pairs_with_each_delimiter() {
    let values = [1.0, 2.0, 3.0, 4.5];

    for delimiter in [' ', ',', '|'] {
        for text in fixed_and_scientific(&values, delimiter) {
            let temp = temp_with(&text);
            let options = ReadOptions::default().delimiter(delimiter as u8);
            let file = temp.reopen().unwrap();
            let (rows, dest) = decode_file(&file, "2d", &options, 2);
            assert_eq!(rows, 2, "delimiter {:?} text {:?}", delimiter, text);
            assert_eq!(f64s(&dest), values);
        }
    }
}

#[test]
fn test_wide_float_table() {
    let nrows = 100;
    let ncols = 50;
    let format = format!("{}d", ncols);

    for delimiter in [' ', ',', '|'] {
        let mut text = String::new();
        for r in 0..nrows {
            let cells: Vec<String> = (0..ncols)
                .map(|c| format!("{:.18e}", (r * ncols + c) as f64))
                .collect();
            text.push_str(&cells.join(&delimiter.to_string()));
            text.push('\n');
        }
        let temp = temp_with(&text);
        let file = temp.reopen().unwrap();
        let options = ReadOptions::default().delimiter(delimiter as u8);

        let (rows, dest) = decode_file(&file, &format, &options, nrows);
        assert_eq!(rows, nrows);
        let expected: Vec<f64> = (0..nrows * ncols).map(|v| v as f64).collect();
        assert_eq!(f64s(&dest), expected);
    }
}

#[test]
fn test_datetime_and_usecols() {
    let temp = temp_with(
        "2011-01-02 00:30,1.0,,15,FR\n\
         2011-01-02 00:45,1.25,,16,TG\n\
         2011-01-02 00:56,1.5,,17,NK\n\
         2011-01-02 01:13,1.0,,18,QQ\n",
    );
    let file = temp.reopen().unwrap();
    let options = ReadOptions::default()
        .usecols(vec![0, 1, -2, -1])
        .datetime_format("%Y-%m-%d %H:%M");

    let buffer = read_all(&file, "Ufh2s", &options).unwrap();
    assert_eq!(buffer.rows(), 4);
    assert_eq!(buffer.layout().stride(), 16);

    let base = 1_293_926_400i64;
    let expected = [
        (base + 30 * 60, 1.0f32, 15i16, b"FR"),
        (base + 45 * 60, 1.25, 16, b"TG"),
        (base + 56 * 60, 1.5, 17, b"NK"),
        (base + 73 * 60, 1.0, 18, b"QQ"),
    ];
    for (i, (seconds, x, index, code)) in expected.iter().enumerate() {
        let row = buffer.row(i).unwrap();
        assert_eq!(&row[0..8], &(seconds * 1_000_000).to_ne_bytes());
        assert_eq!(&row[8..12], &x.to_ne_bytes());
        assert_eq!(&row[12..14], &index.to_ne_bytes());
        assert_eq!(&row[14..16], &code[..]);
    }
}

#[test]
fn test_uint8_codes() {
    let temp = temp_with("  1.0,  1,  2,  3,  4\n 10.0, 11, 12, 13, 14\n100.0, 21, 22, 23, 24\n");
    let file = temp.reopen().unwrap();

    let (rows, dest) = decode_file(&file, "f4B", &ReadOptions::default(), 3);
    assert_eq!(rows, 3);
    for (row, (x, codes)) in dest.chunks_exact(8).zip([
        (1.0f32, [1u8, 2, 3, 4]),
        (10.0, [11, 12, 13, 14]),
        (100.0, [21, 22, 23, 24]),
    ]) {
        assert_eq!(&row[..4], &x.to_ne_bytes());
        assert_eq!(&row[4..], &codes);
    }
}

#[test]
fn test_complex_pairs() {
    let temp = temp_with("  1.0-2.0j, 3+4j\n  5.0e-1, 6.0+0j\n");
    let file = temp.reopen().unwrap();

    let (rows, dest) = decode_file(&file, "2z", &ReadOptions::default(), 2);
    assert_eq!(rows, 2);
    assert_eq!(f64s(&dest), vec![1.0, -2.0, 3.0, 4.0, 0.5, 0.0, 6.0, 0.0]);
}

#[test]
fn test_consecutive_reads_share_file_position() {
    let temp = temp_with("  1.0,  1,  2,  3,  4\n 10.0, 11, 12, 13, 14\n100.0, 21, 22, 23, 24\n");
    let file = temp.reopen().unwrap();
    let options = ReadOptions::default();

    let (rows, dest) = decode_file(&file, "f4B", &options, 1);
    assert_eq!(rows, 1);
    assert_eq!(&dest[..4], &1.0f32.to_ne_bytes());
    assert_eq!(&dest[4..], &[1, 2, 3, 4]);

    let (rows, dest) = decode_file(&file, "f4B", &options, 2);
    assert_eq!(rows, 2);
    assert_eq!(&dest[..4], &10.0f32.to_ne_bytes());
    assert_eq!(&dest[4..8], &[11, 12, 13, 14]);
    assert_eq!(&dest[8..12], &100.0f32.to_ne_bytes());
    assert_eq!(&dest[12..], &[21, 22, 23, 24]);

    let (rows, _) = decode_file(&file, "f4B", &options, 2);
    assert_eq!(rows, 0);
}

#[test]
fn test_count_rows_and_fields_leave_position() {
    let temp = temp_with("# header comment\n1,\"two\nlines\",3\n4,5,6\n");
    let mut file = temp.reopen().unwrap();
    let options = ReadOptions::default().comment(b'#');

    assert_eq!(count_rows(&file, &options).unwrap(), 2);
    assert_eq!(count_fields(&file, &options).unwrap(), 3);
    assert_eq!(file.stream_position().unwrap(), 0);

    file.seek(SeekFrom::End(0)).unwrap();
    let err = count_fields(&file, &options).unwrap_err();
    assert!(matches!(err, TextError::NoData));
}

#[test]
fn test_error_reports_rows_written() {
    let temp = temp_with("1,2\n3,4\n5\n");
    let file = temp.reopen().unwrap();
    let mut dest = vec![0u8; 64];

    let err = read_rows(&file, "2i", &ReadOptions::default(), &mut dest).unwrap_err();
    assert_eq!(err.rows_written, 2);
    assert_eq!(err.code(), 12);
    assert!(matches!(
        err.error,
        TextError::ChangedFieldCount { line: 3, .. }
    ));
    assert_eq!(&dest[..16], &[1i32, 2, 3, 4].map(i32::to_ne_bytes).concat()[..]);
}

#[cfg(feature = "mmap")]
#[test]
fn test_mapped_source_matches_buffered() {
    use textreader::SourceKind;

    let temp = temp_with("1,2.5\n# skipped\n3,4.5\n");
    let buffered = ReadOptions::default().comment(b'#');
    let mapped = buffered.clone().source(SourceKind::Mapped);

    let (rows_a, dest_a) = decode_file(&temp.reopen().unwrap(), "id", &buffered, 4);
    let (rows_b, dest_b) = decode_file(&temp.reopen().unwrap(), "id", &mapped, 4);
    assert_eq!(rows_a, 2);
    assert_eq!(rows_a, rows_b);
    assert_eq!(dest_a, dest_b);
}

#[cfg(feature = "mmap")]
#[test]
fn test_mapped_consecutive_reads() {
    use textreader::SourceKind;

    let temp = temp_with("1\n2\n3\n");
    let file = temp.reopen().unwrap();
    let options = ReadOptions::default().source(SourceKind::Mapped);

    let (rows, dest) = decode_file(&file, "b", &options, 2);
    assert_eq!((rows, dest), (2, vec![1, 2]));
    let (rows, dest) = decode_file(&file, "b", &options, 2);
    assert_eq!((rows, &dest[..1]), (1, &[3u8][..]));
}

//! Decode independent files concurrently
//!
//! _Requires Cargo feature `parallel`._
//!
//! Each file gets its own byte source, tokenizer and destination, so no
//! state is shared between workers.

use std::fs::File;
use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::options::ReadOptions;
use crate::rows::{count_rows, read_all, RowBuffer};

/// Count the rows of every file on the rayon thread pool
///
/// Results are in the order of `paths`.
pub fn count_rows_many<P>(paths: &[P], options: &ReadOptions) -> Vec<Result<usize>>
where
    P: AsRef<Path> + Sync,
{
    debug!(files = paths.len(), "counting rows in parallel");
    paths
        .par_iter()
        .map(|path| {
            let file = File::open(path)?;
            count_rows(&file, options)
        })
        .collect()
}

/// Decode every file with the same layout on the rayon thread pool
///
/// Results are in the order of `paths`.
pub fn read_files<P>(paths: &[P], format: &str, options: &ReadOptions) -> Vec<Result<RowBuffer>>
where
    P: AsRef<Path> + Sync,
{
    debug!(files = paths.len(), format, "decoding files in parallel");
    paths
        .par_iter()
        .map(|path| {
            let file = File::open(path)?;
            read_all(&file, format, options)
        })
        .collect()
}

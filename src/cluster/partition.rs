// src/cluster/partition.rs

use log::debug;
use crate::error::{Error, Result};

/// A contiguous, order-preserving slice of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    /// Position of this chunk among all chunks.
    pub index: usize,
    /// Input position of `values[0]`.
    pub offset: usize,
    pub values: Vec<T>,
}

impl<T> Chunk<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Splits `values` into consecutive chunks of `chunk_size`; only the last
/// chunk may be shorter. Empty input yields no chunks.
pub fn partition<T>(values: Vec<T>, chunk_size: usize) -> Result<Vec<Chunk<T>>> {
    if chunk_size == 0 {
        return Err(Error::invalid_argument("chunk_size must be a positive integer"));
    }

    let total = values.len();
    let mut chunks = Vec::with_capacity(total.div_ceil(chunk_size));
    let mut remaining = values.into_iter();
    let mut offset = 0;

    loop {
        let values: Vec<T> = remaining.by_ref().take(chunk_size).collect();
        if values.is_empty() {
            break;
        }
        let len = values.len();
        chunks.push(Chunk { index: chunks.len(), offset, values });
        offset += len;
    }

    debug!("Partitioned {} items into {} chunks of up to {}", total, chunks.len(), chunk_size);
    Ok(chunks)
}

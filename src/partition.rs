//! Splitting an index space into contiguous chunks.

use crate::error::{Error, Result};
use std::ops::Range;

/// Splits `0..len` into at most `max_parts` contiguous, gap-free ranges.
///
/// Uses `min(max_parts, len)` parts of `len / parts` elements each; the last
/// range absorbs the remainder, so it is never smaller than the others.
/// An empty sequence yields no ranges.
///
/// # Example
///
/// ```
/// use chunkpool::partition;
///
/// let chunks = partition(10, 3).unwrap();
/// assert_eq!(chunks, vec![0..3, 3..6, 6..10]);
/// ```
pub fn partition(len: usize, max_parts: usize) -> Result<Vec<Range<usize>>> {
    if max_parts == 0 {
        return Err(Error::InvalidConcurrency { requested: max_parts });
    }

    let parts = max_parts.min(len);
    if parts == 0 {
        return Ok(Vec::new());
    }

    let chunk_size = len / parts;
    let mut ranges: Vec<Range<usize>> = (0..parts - 1)
        .map(|j| j * chunk_size..(j + 1) * chunk_size)
        .collect();
    ranges.push((parts - 1) * chunk_size..len);
    Ok(ranges)
}

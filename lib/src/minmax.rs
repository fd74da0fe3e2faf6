use tracing::{debug, trace};

use crate::{Error, Point, Result};

/// Min/max-per-bucket sampling on the `key` field.
///
/// Splits the series into `buckets` chunks of `ceil(len / buckets)` samples
/// (the last may be shorter) and keeps the minimum and maximum of each, in
/// time order, once if they are the same sample. Nulls and NaNs are never
/// compared or kept; a chunk holding nothing else contributes nothing.
///
/// Returns every sample unchanged if `len <= 2 * buckets`.
pub fn min_max<'a, S: Point>(series: &'a [S], buckets: usize, key: &str) -> Result<Vec<&'a S>> {
    if buckets == 0 {
        return Err(Error::InvalidBuckets(buckets));
    }

    let n = series.len();
    if n <= buckets.saturating_mul(2) {
        trace!(len = n, buckets, "min/max pass-through");
        return Ok(series.iter().collect());
    }

    let chunk_size = (n + buckets - 1) / buckets;
    debug!(len = n, buckets, chunk_size, "min/max");

    let mut sampled = Vec::with_capacity(2 * buckets);
    for chunk in series.chunks(chunk_size) {
        let Some((min, max)) = extrema(chunk, key) else {
            continue;
        };
        let (first, second) = if min <= max { (min, max) } else { (max, min) };
        sampled.push(&chunk[first]);
        if second != first {
            sampled.push(&chunk[second]);
        }
    }

    Ok(sampled)
}

/// Indices of the first minimum and first maximum valid value in `chunk`.
fn extrema<S: Point>(chunk: &[S], key: &str) -> Option<(usize, usize)> {
    let mut found: Option<((usize, f64), (usize, f64))> = None;
    for (i, point) in chunk.iter().enumerate() {
        let Some(v) = point.value(key) else {
            continue;
        };
        match found.as_mut() {
            None => found = Some(((i, v), (i, v))),
            Some((min, max)) => {
                if v < min.1 {
                    *min = (i, v);
                }
                if v > max.1 {
                    *max = (i, v);
                }
            }
        }
    }
    found.map(|(min, max)| (min.0, max.0))
}

use tracing::{debug, trace};

use crate::bucket::Buckets;
use crate::triangle::{largest_triangle, lookahead_average};
use crate::{Error, Point, Result};

/// Largest Triangle Three Buckets (LTTB) downsampling on the `key` field.
///
/// Reduces a timestamp-ordered series to exactly `threshold` samples while
/// preserving the visual shape of the data. The first and last samples are
/// always kept; every interior bucket contributes the sample forming the
/// largest triangle with the previous pick and the next bucket's average.
///
/// Returns every sample unchanged if `threshold >= series.len()` or
/// `threshold < 3`. Samples are borrowed, never copied or modified, so a
/// null in the source stays null in the output.
pub fn lttb<'a, S: Point>(series: &'a [S], threshold: usize, key: &str) -> Result<Vec<&'a S>> {
    if threshold == 0 {
        return Err(Error::InvalidThreshold(threshold));
    }
    Ok(lttb_indices(series, threshold, key)
        .into_iter()
        .map(|i| &series[i])
        .collect())
}

/// Indices picked by [`lttb`]. `threshold` must already be validated.
pub(crate) fn lttb_indices<S: Point>(series: &[S], threshold: usize, key: &str) -> Vec<usize> {
    let n = series.len();
    let Some(buckets) = Buckets::new(n, threshold) else {
        trace!(len = n, threshold, "lttb pass-through");
        return (0..n).collect();
    };
    debug!(len = n, threshold, bucket_size = buckets.size(), "lttb");

    let mut sampled = Vec::with_capacity(threshold);
    sampled.push(0);

    let mut a_idx = 0usize;
    for (bucket, ahead) in buckets.iter() {
        let avg = lookahead_average(series, ahead, key);
        a_idx = largest_triangle(series, bucket, a_idx, avg, key);
        sampled.push(a_idx);
    }

    sampled.push(n - 1);
    sampled
}

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::debug;

use crate::lttb::lttb_indices;
use crate::{Downsampled, Error, LabeledSeries, Point, Result};

/// Downsamples several related series so they stay comparable on one chart.
///
/// The longest series (the first one, on ties) is the reference: it is reduced
/// with [`lttb`](fn@crate::lttb) at `threshold` and its picks form a shared
/// timestamp grid. Every other series longer than `threshold` keeps the
/// samples whose timestamps are either on that grid or among its own LTTB
/// picks at `ceil(threshold / 2)`. Shorter series, and every series when the
/// reference already fits, are returned unchanged.
///
/// Outputs are in input order and each is a subsequence of its input.
pub fn lttb_multi<'a, S>(
    series: &'a [LabeledSeries<S>],
    threshold: usize,
    key: &str,
) -> Result<Vec<Downsampled<'a, S>>>
where
    S: Point + Sync,
    S::Timestamp: Sync,
{
    if threshold == 0 {
        return Err(Error::InvalidThreshold(threshold));
    }

    let mut reference: Option<usize> = None;
    for (i, labeled) in series.iter().enumerate() {
        let longest = reference.map_or(0, |r| series[r].series.len());
        if labeled.series.len() > longest {
            reference = Some(i);
        }
    }
    let Some(reference) = reference else {
        return Err(Error::NoSeries);
    };

    let reference_len = series[reference].series.len();
    if reference_len <= threshold || threshold <= 2 {
        debug!(reference_len, threshold, "multi-series pass-through");
        return Ok(series.iter().map(Downsampled::unchanged).collect());
    }

    let grid_indices = lttb_indices(&series[reference].series, threshold, key);
    let grid: BTreeSet<&S::Timestamp> = grid_indices
        .iter()
        .map(|&i| series[reference].series[i].timestamp())
        .collect();
    debug!(
        reference = %series[reference].label,
        reference_len,
        threshold,
        grid = grid.len(),
        "multi-series reference"
    );

    let own_threshold = (threshold + 1) / 2;
    let aligned = series
        .par_iter()
        .enumerate()
        .map(|(i, labeled)| {
            if i == reference {
                Downsampled::pick(labeled, &grid_indices)
            } else if labeled.series.len() <= threshold {
                Downsampled::unchanged(labeled)
            } else {
                align(labeled, &grid, own_threshold, key)
            }
        })
        .collect();

    Ok(aligned)
}

/// Keeps the samples of `labeled` whose timestamps are on `grid` or among the
/// series' own LTTB picks.
fn align<'a, S: Point>(
    labeled: &'a LabeledSeries<S>,
    grid: &BTreeSet<&S::Timestamp>,
    threshold: usize,
    key: &str,
) -> Downsampled<'a, S> {
    let own: BTreeSet<&S::Timestamp> = lttb_indices(&labeled.series, threshold, key)
        .into_iter()
        .map(|i| labeled.series[i].timestamp())
        .collect();

    let series: Vec<&S> = labeled
        .series
        .iter()
        .filter(|s| grid.contains(s.timestamp()) || own.contains(s.timestamp()))
        .collect();

    debug!(
        label = %labeled.label,
        len = labeled.series.len(),
        own = own.len(),
        aligned = series.len(),
        "multi-series aligned"
    );

    Downsampled {
        label: &labeled.label,
        series,
    }
}

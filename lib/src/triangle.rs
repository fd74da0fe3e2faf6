use std::ops::Range;

use crate::bucket::midpoint;
use crate::Point;

/// Unsigned area of the triangle `a`, `c`, `avg` (shoelace, halved).
pub fn triangle_area(a: (f64, f64), c: (f64, f64), avg: (f64, f64)) -> f64 {
    0.5 * ((a.0 - avg.0) * (c.1 - a.1) - (a.0 - c.0) * (avg.1 - a.1)).abs()
}

/// Mean `(index, value)` of the valid samples in `window`.
///
/// Falls back to `(midpoint, 0.0)` when the window is empty or holds only
/// nulls and NaNs.
pub fn lookahead_average<S: Point>(series: &[S], window: Range<usize>, key: &str) -> (f64, f64) {
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut count = 0usize;
    for (j, point) in series.iter().enumerate().take(window.end).skip(window.start) {
        if let Some(v) = point.value(key) {
            sum_x += j as f64;
            sum_y += v;
            count += 1;
        }
    }
    if count == 0 {
        return (midpoint(&window) as f64, 0.0);
    }
    (sum_x / count as f64, sum_y / count as f64)
}

/// Picks the index in `bucket` forming the largest triangle with the
/// previously selected `anchor` and the look-ahead average `avg`.
///
/// The x coordinate is the sample index. Invalid values count as 0. Ties go
/// to the lowest index. An empty bucket yields its midpoint, clamped to the
/// last sample.
pub fn largest_triangle<S: Point>(
    series: &[S],
    bucket: Range<usize>,
    anchor: usize,
    avg: (f64, f64),
    key: &str,
) -> usize {
    if bucket.is_empty() {
        return midpoint(&bucket).min(series.len().saturating_sub(1));
    }

    let a = (anchor as f64, series[anchor].value(key).unwrap_or(0.0));
    let mut max_area = f64::NEG_INFINITY;
    let mut max_idx = bucket.start;

    for (j, point) in series.iter().enumerate().take(bucket.end).skip(bucket.start) {
        let c = (j as f64, point.value(key).unwrap_or(0.0));
        let area = triangle_area(a, c, avg);
        if area > max_area {
            max_area = area;
            max_idx = j;
        }
    }

    max_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;

    fn series(values: &[Option<f64>]) -> Vec<Sample<i64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as i64).with("v", v))
            .collect()
    }

    #[test]
    fn area_is_halved_and_unsigned() {
        assert_eq!(triangle_area((0.0, 0.0), (0.0, 2.0), (2.0, 0.0)), 2.0);
        assert_eq!(triangle_area((0.0, 0.0), (2.0, 0.0), (0.0, 2.0)), 2.0);
        assert_eq!(triangle_area((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)), 0.0);
    }

    #[test]
    fn average_skips_invalid_values() {
        let s = series(&[Some(0.0), Some(2.0), None, Some(f64::NAN), Some(4.0)]);
        let (x, y) = lookahead_average(&s, 1..5, "v");
        assert_eq!(x, 2.5);
        assert_eq!(y, 3.0);
    }

    #[test]
    fn average_falls_back_to_midpoint() {
        let s = series(&[Some(1.0), None, Some(f64::NAN), None, Some(1.0)]);
        assert_eq!(lookahead_average(&s, 1..4, "v"), (2.0, 0.0));
        assert_eq!(lookahead_average(&s, 3..3, "v"), (3.0, 0.0));
    }

    #[test]
    fn picks_the_spike() {
        let s = series(&[Some(0.0), Some(1.0), Some(9.0), Some(1.0), Some(0.0)]);
        let avg = lookahead_average(&s, 4..5, "v");
        assert_eq!(largest_triangle(&s, 1..4, 0, avg, "v"), 2);
    }

    #[test]
    fn ties_go_to_first_index() {
        // Every candidate sits at the same height, so all areas are equal.
        let s = series(&[Some(0.0), Some(5.0), Some(5.0), Some(5.0), Some(0.0)]);
        assert_eq!(largest_triangle(&s, 1..4, 0, (4.0, 0.0), "v"), 1);

        // Degenerate: every triangle has zero area.
        let flat = series(&[Some(5.0); 5]);
        assert_eq!(largest_triangle(&flat, 1..4, 0, (4.0, 5.0), "v"), 1);
    }

    #[test]
    fn empty_bucket_yields_midpoint() {
        let s = series(&[Some(0.0); 10]);
        assert_eq!(largest_triangle(&s, 9..9, 3, (9.0, 0.0), "v"), 9);
        assert_eq!(largest_triangle(&s, 4..4, 3, (9.0, 0.0), "v"), 4);
    }

    #[test]
    fn nulls_do_not_break_selection() {
        let s = series(&[Some(0.0), None, Some(f64::NAN), Some(3.0), Some(0.0)]);
        let avg = lookahead_average(&s, 4..5, "v");
        assert_eq!(largest_triangle(&s, 1..4, 0, avg, "v"), 3);
    }
}

use std::cmp::Ordering;
use std::ops::Range;

/// Partition of a series' interior `[1, len-1)` into `threshold - 2` buckets.
///
/// Indices `0` and `len - 1` are never inside a bucket; samplers always keep
/// them. Bucket `i` spans `floor(i * size) + 1 .. floor((i + 1) * size) + 1`
/// with `size = (len - 2) / (threshold - 2)`, so neighbouring buckets can
/// differ in length by one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Buckets {
    len: usize,
    count: usize,
    size: f64,
}

impl Buckets {
    /// Returns `None` when no reduction is possible: `threshold <= 2` or
    /// `threshold >= len`.
    pub fn new(len: usize, threshold: usize) -> Option<Self> {
        if threshold <= 2 || threshold >= len {
            return None;
        }
        Some(Buckets {
            len,
            count: threshold - 2,
            size: (len - 2) as f64 / (threshold - 2) as f64,
        })
    }

    /// Number of interior buckets.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Average number of samples per bucket.
    pub fn size(&self) -> f64 {
        self.size
    }

    // The outer edges are pinned: `k * size` can land a hair under
    // `len - 2` and floor one short of the last interior index.
    fn edge(&self, k: usize) -> usize {
        match k.cmp(&self.count) {
            Ordering::Less => (k as f64 * self.size).floor() as usize + 1,
            Ordering::Equal => self.len - 1,
            Ordering::Greater => self.len,
        }
    }

    /// Index range of bucket `i`. The last bucket ends just before the final
    /// sample.
    pub fn bucket(&self, i: usize) -> Range<usize> {
        self.edge(i)..self.edge(i + 1)
    }

    /// The window averaged when choosing from bucket `i`: the next bucket.
    /// The last bucket looks ahead onto the final sample alone.
    pub fn lookahead(&self, i: usize) -> Range<usize> {
        self.edge(i + 1)..self.edge(i + 2)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Range<usize>, Range<usize>)> + '_ {
        (0..self.count).map(move |i| (self.bucket(i), self.lookahead(i)))
    }
}

/// Middle index of a range, used when a range has nothing to choose from.
pub fn midpoint(range: &Range<usize>) -> usize {
    (range.start + range.end) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_buckets_when_nothing_to_reduce() {
        assert_eq!(Buckets::new(10, 10), None);
        assert_eq!(Buckets::new(10, 20), None);
        assert_eq!(Buckets::new(10, 2), None);
        assert_eq!(Buckets::new(10, 1), None);
        assert_eq!(Buckets::new(2, 1), None);
        assert_eq!(Buckets::new(0, 5), None);
    }

    #[test]
    fn ten_points_into_five() {
        let b = Buckets::new(10, 5).unwrap();
        assert_eq!(b.count(), 3);
        assert!((b.size() - 8.0 / 3.0).abs() < 1e-12);

        assert_eq!(b.bucket(0), 1..3);
        assert_eq!(b.bucket(1), 3..6);
        assert_eq!(b.bucket(2), 6..9);

        assert_eq!(b.lookahead(0), 3..6);
        assert_eq!(b.lookahead(1), 6..9);
        assert_eq!(b.lookahead(2), 9..10);
    }

    #[test]
    fn buckets_cover_interior_without_gaps() {
        for len in 3..200 {
            for threshold in 3..len {
                let b = Buckets::new(len, threshold).unwrap();
                let mut next = 1;
                for (bucket, ahead) in b.iter() {
                    assert_eq!(bucket.start, next, "len={len} threshold={threshold}");
                    assert!(bucket.start < bucket.end, "len={len} threshold={threshold}");
                    assert!(bucket.end <= len - 1);
                    assert!(ahead.start <= ahead.end);
                    assert!(ahead.end <= len);
                    assert_eq!(ahead.start, bucket.end);
                    next = bucket.end;
                }
                assert_eq!(next, len - 1, "len={len} threshold={threshold}");
            }
        }
    }

    #[test]
    fn last_bucket_looks_ahead_onto_final_sample() {
        let b = Buckets::new(10_000, 500).unwrap();
        assert_eq!(b.bucket(497).end, 9_999);
        assert_eq!(b.lookahead(497), 9_999..10_000);
    }

    #[test]
    fn last_bucket_reaches_final_interior_index() {
        // 17 into 13: `11 * (15 / 11)` floors to 14 in floating point.
        let b = Buckets::new(17, 13).unwrap();
        assert_eq!(b.bucket(10), 14..16);
        assert_eq!(b.lookahead(10), 16..17);
    }

    #[test]
    fn midpoint_of_empty_range() {
        assert_eq!(midpoint(&(9..9)), 9);
        assert_eq!(midpoint(&(4..9)), 6);
    }
}

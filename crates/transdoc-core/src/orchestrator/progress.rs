//! Mapping a job's own progress onto the batch as a whole.

/// Batch-wide percentage for job `index` (1-based) of `count` at `local` percent.
///
/// Each job owns an equal slice `[(index-1)/count, index/count] * 100`;
/// `local` is clamped to 0..=100 so the result never leaves that slice.
pub fn batch_percent(index: usize, count: usize, local: i32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let index = index.clamp(1, count);
    let (lo, hi) = slice_bounds(index, count);
    let local = f64::from(local.clamp(0, 100));
    (((index - 1) as f64 * 100.0 + local) / count as f64).clamp(lo, hi)
}

fn slice_bounds(index: usize, count: usize) -> (f64, f64) {
    let n = count as f64;
    ((index - 1) as f64 * 100.0 / n, index as f64 * 100.0 / n)
}

/// Per-job tracker that never reports less than it already has.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MonotonicPercent {
    best: i32,
}

impl MonotonicPercent {
    /// Returns `local` clamped to 0..=100 and raised to the highest value seen.
    pub(crate) fn update(&mut self, local: i32) -> i32 {
        self.best = self.best.max(local.clamp(0, 100));
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_are_equal_and_contiguous() {
        assert_eq!(batch_percent(1, 4, 0), 0.0);
        assert_eq!(batch_percent(1, 4, 100), 25.0);
        assert_eq!(batch_percent(2, 4, 0), 25.0);
        assert_eq!(batch_percent(4, 4, 50), 87.5);
        assert_eq!(batch_percent(4, 4, 100), 100.0);
    }

    #[test]
    fn out_of_range_local_stays_in_slice() {
        for n in 1..=7usize {
            for i in 1..=n {
                for local in [-1, 0, 37, 100, 250] {
                    let p = batch_percent(i, n, local);
                    let lo = (i - 1) as f64 * 100.0 / n as f64;
                    let hi = i as f64 * 100.0 / n as f64;
                    assert!(p >= lo && p <= hi, "{} not in [{}, {}]", p, lo, hi);
                }
            }
        }
    }

    #[test]
    fn finished_job_never_passes_its_upper_bound() {
        for n in 1..=10usize {
            for i in 1..=n {
                let hi = i as f64 * 100.0 / n as f64;
                assert!(batch_percent(i, n, 100) <= hi, "job {} of {}", i, n);
            }
            assert_eq!(batch_percent(n, n, 100), 100.0);
        }
    }

    #[test]
    fn empty_batch_is_zero() {
        assert_eq!(batch_percent(1, 0, 50), 0.0);
    }

    #[test]
    fn monotonic_tracker_ignores_regressions() {
        let mut m = MonotonicPercent::default();
        assert_eq!(m.update(5), 5);
        assert_eq!(m.update(40), 40);
        assert_eq!(m.update(12), 40);
        assert_eq!(m.update(130), 100);
    }
}

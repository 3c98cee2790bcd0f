use std::time::{Duration, Instant};

use crate::candidate::Candidate;
use crate::error::CandidateError;
use crate::format::round_to;
use crate::generator::Dataset;
use crate::memory::MemoryProbe;

/// Reported in place of a negative memory delta.
pub const MEMORY_SENTINEL: f64 = -1.0;

const BYTES_PER_MB: f64 = 1e6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub elapsed_ms: u64,
    /// Megabytes to two decimals, or [`MEMORY_SENTINEL`].
    pub memory_delta_mb: f64,
}

impl Measurement {
    pub fn memory_is_sentinel(&self) -> bool {
        self.memory_delta_mb == MEMORY_SENTINEL
    }
}

/// Convert a pair of byte readings into the reported delta.
pub fn memory_delta_mb(before: usize, after: usize) -> f64 {
    if after < before {
        tracing::trace!(before, after, "negative memory delta clamped");
        return MEMORY_SENTINEL;
    }
    round_to((after - before) as f64 / BYTES_PER_MB, 2)
}

/// Whole milliseconds, rounded to nearest.
pub fn whole_millis(elapsed: Duration) -> u64 {
    ((elapsed.as_micros() + 500) / 1000) as u64
}

/// Time and memory of one candidate invocation.
///
/// The two readings bracket `candidate.run` and nothing else; the dataset
/// is dropped after the clock stops.
pub fn measure<C, P>(candidate: &C, mut dataset: Dataset, probe: &P) -> Result<Measurement, CandidateError>
where
    C: Candidate + ?Sized,
    P: MemoryProbe,
{
    let start = Instant::now();
    let before = probe.read();
    let after = candidate.run(&mut dataset, probe)?;
    let elapsed = start.elapsed();
    drop(dataset);

    Ok(Measurement {
        elapsed_ms: whole_millis(elapsed),
        memory_delta_mb: memory_delta_mb(before, after),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Scripted(Cell<usize>);

    impl MemoryProbe for Scripted {
        fn read(&self) -> usize {
            self.0.get()
        }
    }

    struct Shrinks;

    impl Candidate for Shrinks {
        fn name(&self) -> &'static str {
            "shrinks"
        }

        fn run(&self, dataset: &mut Dataset, probe: &dyn MemoryProbe) -> Result<usize, CandidateError> {
            dataset.clear();
            Ok(probe.read().saturating_sub(5_000_000))
        }
    }

    #[test]
    fn delta_in_megabytes() {
        assert_eq!(memory_delta_mb(0, 2_500_000), 2.5);
        assert_eq!(memory_delta_mb(1_000, 1_000), 0.0);
        assert_eq!(memory_delta_mb(0, 1_234_567), 1.23);
    }

    #[test]
    fn elapsed_rounds_to_nearest_millisecond() {
        assert_eq!(whole_millis(Duration::from_micros(1_500)), 2);
        assert_eq!(whole_millis(Duration::from_micros(1_499)), 1);
        assert_eq!(whole_millis(Duration::from_micros(400)), 0);
        assert_eq!(whole_millis(Duration::from_secs(3)), 3_000);
    }

    #[test]
    fn negative_delta_is_sentinel() {
        assert_eq!(memory_delta_mb(10, 9), MEMORY_SENTINEL);
    }

    #[test]
    fn measure_clamps_reclaimed_memory() {
        let probe = Scripted(Cell::new(8_000_000));
        let m = measure(&Shrinks, vec!["x".to_string(); 4], &probe).unwrap();
        assert!(m.memory_is_sentinel());
    }
}

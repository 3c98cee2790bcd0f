use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::candidate::Candidate;
use crate::config::TrialPlan;
use crate::error::{BenchError, Result};
use crate::generator::{generate, InputShape};
use crate::memory::MemoryProbe;
use crate::report::{ReportAggregator, ReportTable};
use crate::sampler::measure;
use crate::series::{PairKey, SeriesBook, SeriesKey, SeriesKind, SeriesPoint};
use crate::sink::{ReportSink, SeriesSink};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle = 0,
    Running = 1,
    Measuring = 2,
    Yielding = 3,
    Reporting = 4,
}

impl DriverState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => DriverState::Running,
            2 => DriverState::Measuring,
            3 => DriverState::Yielding,
            4 => DriverState::Reporting,
            _ => DriverState::Idle,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// The run finished and this table went to the report sink.
    Completed(ReportTable),
    /// Another run was active; nothing happened.
    Ignored,
}

impl RunOutcome {
    pub fn report(&self) -> Option<&ReportTable> {
        match self {
            RunOutcome::Completed(table) => Some(table),
            RunOutcome::Ignored => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, RunOutcome::Ignored)
    }
}

// Puts the driver back to Idle however the run ends, including a dropped future.
struct RunGuard<'a> {
    state: &'a AtomicU8,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.store(DriverState::Idle as u8, Ordering::Release);
    }
}

/// Sweeps every candidate over both input shapes, one trial at a time.
///
/// Candidates run in list order, shapes in [`InputShape::ALL`] order, and
/// trial sizes grow by `unit_size` per trial. After each trial the driver
/// pushes both series to the series sink and then suspends for the plan's
/// pause, so a single-threaded runtime gets to do other work between
/// trials. Only one run can be active; a second `run` call made meanwhile
/// returns [`RunOutcome::Ignored`].
pub struct BenchmarkDriver<C, P> {
    plan: TrialPlan,
    candidates: Vec<C>,
    probe: P,
    state: AtomicU8,
}

impl<C: Candidate, P: MemoryProbe> BenchmarkDriver<C, P> {
    pub fn new(plan: TrialPlan, candidates: Vec<C>, probe: P) -> Self {
        Self {
            plan,
            candidates,
            probe,
            state: AtomicU8::new(DriverState::Idle as u8),
        }
    }

    pub fn plan(&self) -> &TrialPlan {
        &self.plan
    }

    pub fn candidates(&self) -> &[C] {
        &self.candidates
    }

    pub fn state(&self) -> DriverState {
        DriverState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Pairs in execution order.
    pub fn pairs(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.candidates.iter().enumerate().flat_map(|(index, candidate)| {
            InputShape::ALL
                .into_iter()
                .map(move |shape| PairKey::new(index, candidate.name(), shape))
        })
    }

    pub async fn run<S, R>(&self, series: &mut S, report: &mut R) -> Result<RunOutcome>
    where
        S: SeriesSink + ?Sized,
        R: ReportSink + ?Sized,
    {
        let Some(_guard) = self.try_start() else {
            debug!("run already in progress, start ignored");
            return Ok(RunOutcome::Ignored);
        };

        let width = self.plan.token_width();
        let labels = self.plan.trial_sizes();
        info!(
            candidates = self.candidates.len(),
            unit_size = self.plan.unit_size,
            num_units = self.plan.num_units,
            token_width = width,
            "benchmark run started"
        );

        let mut book = SeriesBook::default();
        let mut aggregator = ReportAggregator::default();

        for (index, candidate) in self.candidates.iter().enumerate() {
            for shape in InputShape::ALL {
                let pair = PairKey::new(index, candidate.name(), shape);
                self.set_state(DriverState::Running);
                series.prepare(&pair, &labels);

                let started = Instant::now();
                for (trial, &size) in (1..).zip(&labels) {
                    self.set_state(DriverState::Measuring);
                    let dataset = generate(shape, size, width);
                    let measurement =
                        measure(candidate, dataset, &self.probe).map_err(|source| {
                            warn!(%pair, trial, "candidate failed: {source}");
                            BenchError::Candidate {
                                pair,
                                trial,
                                source,
                            }
                        })?;
                    debug!(
                        %pair,
                        trial,
                        size,
                        elapsed_ms = measurement.elapsed_ms,
                        memory_delta_mb = measurement.memory_delta_mb,
                        "trial measured"
                    );

                    aggregator.update(pair, &measurement);
                    let time = SeriesPoint {
                        trial,
                        size,
                        value: measurement.elapsed_ms as f64,
                    };
                    let space = SeriesPoint {
                        trial,
                        size,
                        value: measurement.memory_delta_mb,
                    };
                    for (kind, point) in [(SeriesKind::Time, time), (SeriesKind::Space, space)] {
                        let points = book.push(SeriesKey { pair, kind }, point);
                        series.append_series(&pair, kind, points);
                    }

                    self.set_state(DriverState::Yielding);
                    self.pause().await;
                }

                let total = started.elapsed().as_secs_f64();
                aggregator.finalize(pair, total);
                info!(
                    %pair,
                    points = book.with_read(SeriesKey { pair, kind: SeriesKind::Time }, |s| s.len()),
                    total_wall_seconds = total,
                    "pair finished"
                );
            }
        }

        self.set_state(DriverState::Reporting);
        let table = aggregator.table();
        report.render_report(table.clone());
        info!(rows = table.len(), "benchmark run finished");
        Ok(RunOutcome::Completed(table))
    }

    fn try_start(&self) -> Option<RunGuard<'_>> {
        self.state
            .compare_exchange(
                DriverState::Idle as u8,
                DriverState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| RunGuard { state: &self.state })
    }

    fn set_state(&self, state: DriverState) {
        self.state.store(state as u8, Ordering::Release);
    }

    async fn pause(&self) {
        if self.plan.pause.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.plan.pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Strategy;
    use crate::memory::AllocatorProbe;
    use std::time::Duration;

    #[test]
    fn pairs_follow_candidate_then_shape_order() {
        let plan = TrialPlan::new(1, 1, Duration::ZERO).unwrap();
        let driver = BenchmarkDriver::new(
            plan,
            vec![Strategy::AppendBuild, Strategy::FilterBuild],
            AllocatorProbe,
        );
        let pairs: Vec<String> = driver.pairs().map(|p| p.to_string()).collect();
        assert_eq!(
            pairs,
            [
                "append-build/unique",
                "append-build/repeat",
                "filter-build/unique",
                "filter-build/repeat"
            ]
        );
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn state_round_trips_through_u8() {
        for state in [
            DriverState::Idle,
            DriverState::Running,
            DriverState::Measuring,
            DriverState::Yielding,
            DriverState::Reporting,
        ] {
            assert_eq!(DriverState::from_u8(state as u8), state);
        }
    }
}

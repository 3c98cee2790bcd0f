use ordered_float::OrderedFloat;

use crate::hash::FastHashMap;
use crate::sampler::{Measurement, MEMORY_SENTINEL};
use crate::series::PairKey;

/// Running totals for one pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    /// Wall time of the whole trial loop, sealed when the pair finishes.
    pub total_wall_seconds: f64,
    pub max_time_ms: u64,
    max_space_mb: Option<OrderedFloat<f64>>,
    pub trials: usize,
}

impl Summary {
    pub fn fold(&mut self, measurement: &Measurement) {
        self.max_time_ms = self.max_time_ms.max(measurement.elapsed_ms);
        let space = OrderedFloat(measurement.memory_delta_mb);
        self.max_space_mb = Some(match self.max_space_mb {
            Some(current) => current.max(space),
            None => space,
        });
        self.trials += 1;
    }

    /// Largest space reading seen, or the sentinel before any trial.
    pub fn max_space_mb(&self) -> f64 {
        self.max_space_mb.map_or(MEMORY_SENTINEL, |v| v.into_inner())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportRow {
    pub pair: PairKey,
    pub total_wall_seconds: f64,
    pub max_time_ms: u64,
    pub max_space_mb: f64,
    pub trials: usize,
}

/// One row per pair, in execution order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportTable {
    rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, pair: &PairKey) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.pair == *pair)
    }
}

impl<'a> IntoIterator for &'a ReportTable {
    type Item = &'a ReportRow;
    type IntoIter = std::slice::Iter<'a, ReportRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Folds measurements into per-pair [`Summary`] values. Entries are never
/// removed; a new run builds a new aggregator.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    order: Vec<PairKey>,
    summaries: FastHashMap<PairKey, Summary>,
}

impl ReportAggregator {
    pub fn update(&mut self, pair: PairKey, measurement: &Measurement) {
        self.entry(pair).fold(measurement);
    }

    pub fn finalize(&mut self, pair: PairKey, total_wall_seconds: f64) {
        self.entry(pair).total_wall_seconds = total_wall_seconds;
    }

    pub fn summary(&self, pair: &PairKey) -> Option<&Summary> {
        self.summaries.get(pair)
    }

    pub fn table(&self) -> ReportTable {
        let rows = self
            .order
            .iter()
            .filter_map(|pair| {
                let summary = self.summaries.get(pair)?;
                Some(ReportRow {
                    pair: *pair,
                    total_wall_seconds: summary.total_wall_seconds,
                    max_time_ms: summary.max_time_ms,
                    max_space_mb: summary.max_space_mb(),
                    trials: summary.trials,
                })
            })
            .collect();
        ReportTable { rows }
    }

    fn entry(&mut self, pair: PairKey) -> &mut Summary {
        if !self.summaries.contains_key(&pair) {
            self.order.push(pair);
        }
        self.summaries.entry(pair).or_default()
    }
}

#![allow(dead_code)]
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use dedupbench::{
    Candidate, CandidateError, Dataset, MemoryProbe, PairKey, ReportSink, ReportTable,
    SeriesKind, SeriesPoint, SeriesSink,
};

#[derive(Default)]
pub struct RecordingSeries {
    pub prepared: Vec<(PairKey, Vec<usize>)>,
    pub appends: usize,
    pub latest: HashMap<(PairKey, SeriesKind), Vec<SeriesPoint>>,
}

impl RecordingSeries {
    pub fn series(&self, pair: PairKey, kind: SeriesKind) -> &[SeriesPoint] {
        self.latest
            .get(&(pair, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl SeriesSink for RecordingSeries {
    fn prepare(&mut self, pair: &PairKey, labels: &[usize]) {
        self.prepared.push((*pair, labels.to_vec()));
    }

    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) {
        self.appends += 1;
        self.latest.insert((*pair, kind), points.to_vec());
    }
}

#[derive(Default)]
pub struct RecordingReport {
    pub tables: Vec<ReportTable>,
}

impl ReportSink for RecordingReport {
    fn render_report(&mut self, table: ReportTable) {
        self.tables.push(table);
    }
}

/// Keeps a copy of every dataset it is handed.
#[derive(Default)]
pub struct Inspector {
    pub datasets: RefCell<Vec<Dataset>>,
}

impl Candidate for Inspector {
    fn name(&self) -> &'static str {
        "inspector"
    }

    fn run(&self, dataset: &mut Dataset, probe: &dyn MemoryProbe) -> Result<usize, CandidateError> {
        self.datasets.borrow_mut().push(dataset.clone());
        Ok(probe.read())
    }
}

/// Fails on exactly one call, counting from 1.
pub struct FailsOnCall {
    pub fail_on: usize,
    pub calls: Cell<usize>,
}

impl FailsOnCall {
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Cell::new(0),
        }
    }
}

impl Candidate for FailsOnCall {
    fn name(&self) -> &'static str {
        "fails-on-call"
    }

    fn run(&self, _dataset: &mut Dataset, probe: &dyn MemoryProbe) -> Result<usize, CandidateError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call == self.fail_on {
            return Err(CandidateError::Failed(format!("boom on call {call}")));
        }
        Ok(probe.read())
    }
}

/// Probe that reads a fixed value.
pub struct FixedProbe(pub usize);

impl MemoryProbe for FixedProbe {
    fn read(&self) -> usize {
        self.0
    }
}

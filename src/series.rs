use std::fmt;

use crate::generator::InputShape;
use crate::hash::FastHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CandidateId {
    /// Position in the driver's candidate list.
    pub index: usize,
    pub name: &'static str,
}

/// A (candidate, shape) combination; one full trial sweep each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub candidate: CandidateId,
    pub shape: InputShape,
}

impl PairKey {
    pub fn new(index: usize, name: &'static str, shape: InputShape) -> Self {
        Self {
            candidate: CandidateId { index, name },
            shape,
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.candidate.name, self.shape)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Milliseconds.
    Time,
    /// Megabytes.
    Space,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 2] = [SeriesKind::Time, SeriesKind::Space];

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesKind::Time => "time",
            SeriesKind::Space => "space",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    /// 1-based trial index, the x-axis position.
    pub trial: usize,
    /// Dataset length for this trial.
    pub size: usize,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub pair: PairKey,
    pub kind: SeriesKind,
}

/// Every series of one run, addressed by [`SeriesKey`].
#[derive(Debug, Default)]
pub struct SeriesBook {
    series: FastHashMap<SeriesKey, Vec<SeriesPoint>>,
}

impl SeriesBook {
    pub fn with_read<F, R>(&self, key: SeriesKey, f: F) -> R
    where
        F: FnOnce(&[SeriesPoint]) -> R,
    {
        f(self.series.get(&key).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Append one point and return the series so far.
    pub fn push(&mut self, key: SeriesKey, point: SeriesPoint) -> &[SeriesPoint] {
        let points = self.series.entry(key).or_default();
        points.push(point);
        points
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

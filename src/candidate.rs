use std::fmt;
use std::hint::black_box;

use heck::ToKebabCase;

use crate::error::CandidateError;
use crate::generator::Dataset;
use crate::hash::FastHashSet;
use crate::memory::MemoryProbe;

/// An algorithm under comparison.
///
/// `run` deduplicates `dataset` (which it may rewrite) and returns the
/// probe's reading taken right after the work, while the strategy's
/// working structures are still alive. The deduplicated output itself is
/// not returned.
pub trait Candidate {
    fn name(&self) -> &'static str;

    fn run(&self, dataset: &mut Dataset, probe: &dyn MemoryProbe) -> Result<usize, CandidateError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Walk from the back and `remove` every repeat out of the input itself.
    InPlaceRemoval,
    /// Grow a fresh vector with `push`.
    AppendBuild,
    /// Fill a buffer sized to the input, then copy the live prefix out.
    PreSizedSliceBuild,
    /// Fill a buffer sized to the input, then cut its tail off in place.
    PreSizedSpliceBuild,
    /// Single `filter` pass keyed on set insertion.
    FilterBuild,
}

impl Strategy {
    /// Declared run order.
    pub const ALL: [Strategy; 5] = [
        Strategy::InPlaceRemoval,
        Strategy::AppendBuild,
        Strategy::PreSizedSliceBuild,
        Strategy::PreSizedSpliceBuild,
        Strategy::FilterBuild,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::InPlaceRemoval => "in-place-removal",
            Strategy::AppendBuild => "append-build",
            Strategy::PreSizedSliceBuild => "pre-sized-slice-build",
            Strategy::PreSizedSpliceBuild => "pre-sized-splice-build",
            Strategy::FilterBuild => "filter-build",
        }
    }

    /// Accepts any casing of a strategy name (`InPlaceRemoval`,
    /// `in_place_removal`, `in-place-removal`).
    pub fn from_name(name: &str) -> Option<Strategy> {
        let wanted = name.to_kebab_case();
        Strategy::ALL.into_iter().find(|s| s.name() == wanted)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl Candidate for Strategy {
    fn name(&self) -> &'static str {
        Strategy::name(*self)
    }

    fn run(&self, dataset: &mut Dataset, probe: &dyn MemoryProbe) -> Result<usize, CandidateError> {
        let reading = match self {
            Strategy::InPlaceRemoval => {
                let seen = remove_in_place(dataset);
                let reading = probe.read();
                tracing::trace!(kept = dataset.len(), distinct = seen.len(), "deduplicated");
                black_box(&seen);
                reading
            }
            Strategy::AppendBuild => append_build(dataset).read(probe),
            Strategy::PreSizedSliceBuild => pre_sized_slice_build(dataset)?.read(probe),
            Strategy::PreSizedSpliceBuild => pre_sized_splice_build(dataset)?.read(probe),
            Strategy::FilterBuild => filter_build(dataset).read(probe),
        };
        Ok(reading)
    }
}

/// Output of the building strategies together with their uniqueness set.
#[derive(Debug)]
pub(crate) struct Deduped<'a> {
    pub(crate) kept: Vec<&'a str>,
    pub(crate) seen: FastHashSet<&'a str>,
}

impl Deduped<'_> {
    /// Take the probe reading while the output and set are still alive.
    fn read(&self, probe: &dyn MemoryProbe) -> usize {
        let reading = probe.read();
        tracing::trace!(kept = self.kept.len(), distinct = self.seen.len(), "deduplicated");
        black_box(self);
        reading
    }
}

pub(crate) fn remove_in_place(data: &mut Dataset) -> FastHashSet<String> {
    let mut seen = FastHashSet::default();
    for i in (0..data.len()).rev() {
        if seen.contains(data[i].as_str()) {
            data.remove(i);
        } else {
            seen.insert(data[i].clone());
        }
    }
    seen
}

pub(crate) fn append_build(data: &[String]) -> Deduped<'_> {
    let mut seen = FastHashSet::default();
    let mut kept = Vec::new();
    for token in data {
        if seen.contains(token.as_str()) {
            continue;
        }
        seen.insert(token.as_str());
        kept.push(token.as_str());
    }
    Deduped { kept, seen }
}

fn fill_pre_sized(data: &[String]) -> Result<(Vec<&str>, usize, FastHashSet<&str>), CandidateError> {
    let mut buf: Vec<&str> = Vec::new();
    buf.try_reserve_exact(data.len())
        .map_err(|source| CandidateError::Allocation {
            requested: data.len(),
            source,
        })?;
    buf.resize(data.len(), "");
    let mut seen = FastHashSet::default();
    let mut len = 0;
    for token in data {
        if seen.insert(token.as_str()) {
            buf[len] = token.as_str();
            len += 1;
        }
    }
    Ok((buf, len, seen))
}

pub(crate) fn pre_sized_slice_build(data: &[String]) -> Result<Deduped<'_>, CandidateError> {
    let (buf, len, seen) = fill_pre_sized(data)?;
    let kept = buf[..len].to_vec();
    Ok(Deduped { kept, seen })
}

pub(crate) fn pre_sized_splice_build(data: &[String]) -> Result<Deduped<'_>, CandidateError> {
    let (mut buf, len, seen) = fill_pre_sized(data)?;
    buf.truncate(len);
    Ok(Deduped { kept: buf, seen })
}

pub(crate) fn filter_build(data: &[String]) -> Deduped<'_> {
    let mut seen = FastHashSet::default();
    let kept = data
        .iter()
        .map(String::as_str)
        .filter(|token| seen.insert(*token))
        .collect();
    Deduped { kept, seen }
}

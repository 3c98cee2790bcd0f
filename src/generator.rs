use std::fmt;

/// Filler used for every token of a repeated dataset.
pub const REPEAT_FILLER: char = 'a';

/// One trial's input. Owned by the trial that builds it.
pub type Dataset = Vec<String>;

/// Composition policy for generated datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputShape {
    /// Every token distinct: no element is ever skipped.
    Unique,
    /// Every token identical: everything after the first is a duplicate.
    Repeat,
}

impl InputShape {
    pub const ALL: [InputShape; 2] = [InputShape::Unique, InputShape::Repeat];

    pub fn as_str(self) -> &'static str {
        match self {
            InputShape::Unique => "unique",
            InputShape::Repeat => "repeat",
        }
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Number of decimal digits of `max_size`, used as the fixed token width.
///
/// Computed once from the largest trial so every dataset in a run uses the
/// same per-token footprint.
pub fn token_width(max_size: usize) -> usize {
    max_size.max(1).ilog10() as usize + 1
}

pub fn generate(shape: InputShape, size: usize, width: usize) -> Dataset {
    match shape {
        InputShape::Unique => unique_padded(size, width),
        InputShape::Repeat => repeated_filler(size, width),
    }
}

pub fn unique_padded(size: usize, width: usize) -> Dataset {
    (0..size).map(|i| format!("{i:0>width$}")).collect()
}

pub fn repeated_filler(size: usize, width: usize) -> Dataset {
    let token: String = std::iter::repeat(REPEAT_FILLER).take(width).collect();
    vec![token; size]
}

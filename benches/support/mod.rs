use std::sync::Mutex;

use dedupbench::{generate, token_width, Dataset, InputShape};
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

pub mod mem;

pub use mem::record_mem;

static BASE_SEED: Lazy<u64> = Lazy::new(|| {
    std::env::var("DEDUPBENCH_BENCH_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x7d11_5eed_f065_cafe)
});

static RNG_COUNTER: Lazy<Mutex<u64>> = Lazy::new(|| Mutex::new(0));

pub fn usize_env(name: &str, default: usize) -> usize {
    dedupbench::config::usize_env(name, default)
}

#[inline]
pub fn seeded_rng() -> StdRng {
    let mut guard = RNG_COUNTER.lock().unwrap();
    let seed = BASE_SEED.wrapping_add(*guard);
    *guard = guard.wrapping_add(1);
    StdRng::seed_from_u64(seed)
}

/// Dataset with the harness's fixed token width for `max_size`.
pub fn dataset(shape: InputShape, size: usize, max_size: usize) -> Dataset {
    generate(shape, size, token_width(max_size))
}

/// Unique tokens in a seeded random order instead of ascending.
pub fn shuffled_unique(size: usize, max_size: usize) -> Dataset {
    let mut data = dataset(InputShape::Unique, size, max_size);
    data.shuffle(&mut seeded_rng());
    data
}

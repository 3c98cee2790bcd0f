use std::{
    fs::{create_dir_all, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

use once_cell::sync::Lazy;

static LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
const MEMORY_CSV: &str = "target/bench-mem/memory.csv";

/// Append one `bench_id,delta_mb` row; failures are reported, not fatal.
pub fn record_mem(bench_id: impl std::fmt::Display, delta_mb: f64) {
    let row = format!("{bench_id},{}", dedupbench::format::render(delta_mb));
    let _guard = LOCK.lock().unwrap();
    if let Err(err) = append_row(Path::new(MEMORY_CSV), &row) {
        eprintln!("bench memory row {row:?} not recorded: {err}");
    }
}

fn append_row(path: &Path, row: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let fresh = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if fresh {
        writeln!(file, "bench_id,delta_mb")?;
    }
    writeln!(file, "{row}")
}

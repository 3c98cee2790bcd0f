use std::{
    fs::{create_dir_all, File},
    io::{self, BufWriter, Stdout, Write},
    path::{Path, PathBuf},
};

use crate::format::render;
use crate::hash::FastHashMap;
use crate::report::ReportTable;
use crate::series::{PairKey, SeriesKey, SeriesKind, SeriesPoint};

pub const SERIES_FILE: &str = "series.csv";
pub const REPORT_FILE: &str = "report.csv";

/// Receives every series after each trial.
pub trait SeriesSink {
    /// Called once per pair before its first trial with the x-axis labels
    /// (trial sizes) the pair will sweep.
    fn prepare(&mut self, _pair: &PairKey, _labels: &[usize]) {}

    /// `points` is the whole series so far, in trial order.
    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]);
}

/// Receives the final table once per completed run.
pub trait ReportSink {
    fn render_report(&mut self, table: ReportTable);
}

impl<T: SeriesSink + ?Sized> SeriesSink for &mut T {
    fn prepare(&mut self, pair: &PairKey, labels: &[usize]) {
        (**self).prepare(pair, labels)
    }

    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) {
        (**self).append_series(pair, kind, points)
    }
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    fn render_report(&mut self, table: ReportTable) {
        (**self).render_report(table)
    }
}

impl<T: SeriesSink> SeriesSink for Option<T> {
    fn prepare(&mut self, pair: &PairKey, labels: &[usize]) {
        if let Some(sink) = self {
            sink.prepare(pair, labels);
        }
    }

    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) {
        if let Some(sink) = self {
            sink.append_series(pair, kind, points);
        }
    }
}

impl<T: ReportSink> ReportSink for Option<T> {
    fn render_report(&mut self, table: ReportTable) {
        if let Some(sink) = self {
            sink.render_report(table);
        }
    }
}

impl<A: SeriesSink, B: SeriesSink> SeriesSink for (A, B) {
    fn prepare(&mut self, pair: &PairKey, labels: &[usize]) {
        self.0.prepare(pair, labels);
        self.1.prepare(pair, labels);
    }

    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) {
        self.0.append_series(pair, kind, points);
        self.1.append_series(pair, kind, points);
    }
}

impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn render_report(&mut self, table: ReportTable) {
        self.0.render_report(table.clone());
        self.1.render_report(table);
    }
}

/// Prints the newest point of every series as it arrives.
pub struct ConsoleSeriesSink<W: Write = Stdout> {
    out: W,
    trials: usize,
}

impl ConsoleSeriesSink {
    pub fn stdout(trials: usize) -> Self {
        Self::new(io::stdout(), trials)
    }
}

impl<W: Write> ConsoleSeriesSink<W> {
    pub fn new(out: W, trials: usize) -> Self {
        Self { out, trials }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SeriesSink for ConsoleSeriesSink<W> {
    fn prepare(&mut self, pair: &PairKey, labels: &[usize]) {
        let first = labels.first().copied().unwrap_or(0);
        let last = labels.last().copied().unwrap_or(0);
        if let Err(err) = writeln!(self.out, "=== {pair}: sizes {first}..={last}") {
            tracing::warn!("failed to write series header: {err}");
        }
    }

    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) {
        let Some(point) = points.last() else {
            return;
        };
        let unit = match kind {
            SeriesKind::Time => "ms",
            SeriesKind::Space => "MB",
        };
        if let Err(err) = writeln!(
            self.out,
            "{:<34} {:<5} {:>4}/{:<4} n={:<10} {:>10} {unit}",
            pair.to_string(),
            kind.as_str(),
            point.trial,
            self.trials,
            point.size,
            render(point.value),
        ) {
            tracing::warn!("failed to write series point: {err}");
        }
    }
}

/// Writes `pair,kind,trial,size,value` rows, one per new point.
pub struct CsvSeriesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: FastHashMap<SeriesKey, usize>,
}

impl CsvSeriesSink {
    /// Create `<dir>/series.csv`, replacing any previous run's file.
    pub fn create(dir: &Path) -> io::Result<Self> {
        create_dir_all(dir)?;
        let path = dir.join(SERIES_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "pair,kind,trial,size,value")?;
        Ok(Self {
            path,
            writer,
            written: FastHashMap::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_rows(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) -> io::Result<()> {
        let written = self.written.entry(SeriesKey { pair: *pair, kind }).or_default();
        for point in points.iter().skip(*written) {
            writeln!(
                self.writer,
                "{pair},{kind},{},{},{}",
                point.trial,
                point.size,
                render(point.value)
            )?;
            *written += 1;
        }
        self.writer.flush()
    }
}

impl SeriesSink for CsvSeriesSink {
    // A pair starts over from trial 1, so forget what an earlier run wrote.
    fn prepare(&mut self, pair: &PairKey, _labels: &[usize]) {
        for kind in SeriesKind::ALL {
            self.written.remove(&SeriesKey { pair: *pair, kind });
        }
    }

    fn append_series(&mut self, pair: &PairKey, kind: SeriesKind, points: &[SeriesPoint]) {
        if let Err(err) = self.write_rows(pair, kind, points) {
            tracing::warn!("failed to record series row for {}: {err}", self.path.display());
        }
    }
}

/// Fixed-width summary table.
pub struct TableReportSink<W: Write = Stdout> {
    out: W,
}

impl TableReportSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TableReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_table(&mut self, table: &ReportTable) -> io::Result<()> {
        let rule = "=".repeat(80);
        writeln!(self.out, "{rule}")?;
        writeln!(
            self.out,
            "{:<40} {:>12} {:>12} {:>12}",
            "pair", "total s", "max ms", "max MB"
        )?;
        writeln!(self.out, "{rule}")?;
        for row in table {
            writeln!(
                self.out,
                "{:<40} {:>12.3} {:>12} {:>12}",
                row.pair.to_string(),
                row.total_wall_seconds,
                row.max_time_ms,
                render(row.max_space_mb),
            )?;
        }
        writeln!(self.out, "{rule}")?;
        self.out.flush()
    }
}

impl<W: Write> ReportSink for TableReportSink<W> {
    fn render_report(&mut self, table: ReportTable) {
        if let Err(err) = self.write_table(&table) {
            tracing::warn!("failed to print report: {err}");
        }
    }
}

/// Writes `<dir>/report.csv`, replacing the previous report.
pub struct CsvReportSink {
    path: PathBuf,
}

impl CsvReportSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(REPORT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_table(&self, table: &ReportTable) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            create_dir_all(dir)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        writeln!(writer, "candidate,shape,total_wall_seconds,max_time_ms,max_space_mb")?;
        for row in table {
            writeln!(
                writer,
                "{},{},{},{},{}",
                row.pair.candidate.name,
                row.pair.shape,
                render(row.total_wall_seconds),
                row.max_time_ms,
                render(row.max_space_mb)
            )?;
        }
        writer.flush()
    }
}

impl ReportSink for CsvReportSink {
    fn render_report(&mut self, table: ReportTable) {
        if let Err(err) = self.write_table(&table) {
            tracing::warn!("failed to write report {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::InputShape;
    use crate::report::ReportAggregator;
    use crate::sampler::Measurement;

    fn point(trial: usize, value: f64) -> SeriesPoint {
        SeriesPoint {
            trial,
            size: trial * 10,
            value,
        }
    }

    #[test]
    fn console_prints_latest_point_only() {
        let pair = PairKey::new(0, "append-build", InputShape::Unique);
        let mut sink = ConsoleSeriesSink::new(Vec::new(), 2);
        sink.append_series(&pair, SeriesKind::Time, &[point(1, 5.0)]);
        sink.append_series(&pair, SeriesKind::Time, &[point(1, 5.0), point(2, 7.0)]);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("2/2"));
        assert!(lines[1].contains("7 ms"));
    }

    #[test]
    fn table_has_one_line_per_row() {
        let mut agg = ReportAggregator::default();
        for (i, name) in ["a", "b"].into_iter().enumerate() {
            let pair = PairKey::new(i, name, InputShape::Repeat);
            agg.update(
                pair,
                &Measurement {
                    elapsed_ms: 4,
                    memory_delta_mb: 0.5,
                },
            );
            agg.finalize(pair, 1.5);
        }
        let mut sink = TableReportSink::new(Vec::new());
        sink.render_report(agg.table());
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("a/repeat"));
        assert!(text.contains("b/repeat"));
        assert_eq!(text.lines().count(), 3 + 2 + 1);
    }
}

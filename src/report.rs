//! Price reports computed over the merged, sorted record sequence.
//!
//! Each report is a `;`-separated file with a header row followed by one row
//! per change of the tracked statistic.

use anyhow::{Context, Result};
use log::info;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Median,
    Min,
    Max,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Median, ReportKind::Min, ReportKind::Max];

    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::Median => "price_median.log",
            ReportKind::Min => "price_min.log",
            ReportKind::Max => "price_max.log",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ReportKind::Median => "price_median",
            ReportKind::Min => "price_min",
            ReportKind::Max => "price_max",
        }
    }

    fn tracker(self) -> Box<dyn PriceTracker> {
        match self {
            ReportKind::Median => Box::new(RunningMedian::new()),
            ReportKind::Min => Box::new(RunningExtreme::min()),
            ReportKind::Max => Box::new(RunningExtreme::max()),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::Median => "median",
            ReportKind::Min => "min",
            ReportKind::Max => "max",
        };
        f.write_str(name)
    }
}

/// Consumes prices in order and yields the new value whenever a row is due
pub trait PriceTracker {
    fn observe(&mut self, price: f64) -> Option<f64>;
}

/// Total order over prices so they can live in a heap
#[derive(Debug, Clone, Copy)]
struct Price(f64);

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Exact running median over two heaps.
///
/// `lower` holds the smaller half (max at the top), `upper` the larger half.
/// `lower` is never shorter than `upper` and at most one element longer.
#[derive(Debug, Default)]
pub struct RunningMedian {
    lower: BinaryHeap<Price>,
    upper: BinaryHeap<Reverse<Price>>,
    current: Option<f64>,
}

impl RunningMedian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        match self.lower.peek() {
            Some(top) if value > top.0 => self.upper.push(Reverse(Price(value))),
            _ => self.lower.push(Price(value)),
        }

        if self.lower.len() > self.upper.len() + 1 {
            if let Some(moved) = self.lower.pop() {
                self.upper.push(Reverse(moved));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(moved)) = self.upper.pop() {
                self.lower.push(moved);
            }
        }
    }

    pub fn median(&self) -> Option<f64> {
        let low = self.lower.peek()?.0;
        if self.lower.len() > self.upper.len() {
            return Some(low);
        }
        let high = self.upper.peek().map(|Reverse(p)| p.0)?;
        Some((low + high) / 2.0)
    }

    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

impl PriceTracker for RunningMedian {
    fn observe(&mut self, price: f64) -> Option<f64> {
        self.push(price);
        let median = self.median()?;
        if self.current == Some(median) {
            return None;
        }
        self.current = Some(median);
        Some(median)
    }
}

/// Running minimum or maximum; rows only on a strict improvement
#[derive(Debug)]
pub struct RunningExtreme {
    current: Option<f64>,
    better: fn(f64, f64) -> bool,
}

impl RunningExtreme {
    pub fn min() -> Self {
        Self {
            current: None,
            better: |candidate, current| candidate < current,
        }
    }

    pub fn max() -> Self {
        Self {
            current: None,
            better: |candidate, current| candidate > current,
        }
    }
}

impl PriceTracker for RunningExtreme {
    fn observe(&mut self, price: f64) -> Option<f64> {
        match self.current {
            Some(current) if !(self.better)(price, current) => None,
            _ => {
                self.current = Some(price);
                Some(price)
            }
        }
    }
}

/// `(receive_ts, value)` rows of one report, header excluded
pub fn report_rows(kind: ReportKind, records: &[Record]) -> Vec<(u64, f64)> {
    let mut tracker = kind.tracker();
    records
        .iter()
        .filter_map(|record| {
            tracker
                .observe(record.price)
                .map(|value| (record.receive_ts, value))
        })
        .collect()
}

/// Write one report into `writer`, returning the number of data rows
pub fn write_report_to<W: Write>(
    kind: ReportKind,
    records: &[Record],
    writer: &mut W,
) -> std::io::Result<usize> {
    writeln!(writer, "receive_ts;{}", kind.column())?;
    let rows = report_rows(kind, records);
    for (receive_ts, value) in &rows {
        writeln!(writer, "{};{:.6}", receive_ts, value)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Create `<dir>/<report file>` and write the report into it
pub fn write_report(kind: ReportKind, records: &[Record], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(kind.file_name());
    let file = File::create(&path)
        .with_context(|| format!("Failed to open output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let rows = write_report_to(kind, records, &mut writer)
        .with_context(|| format!("Failed to write {} report to {}", kind, path.display()))?;

    info!(
        "{} log written to: {} - {} lines",
        kind,
        path.display(),
        rows
    );
    Ok(path)
}

/// Write every selected report, stopping at the first failure
pub fn write_reports(kinds: &[ReportKind], records: &[Record], dir: &Path) -> Result<Vec<PathBuf>> {
    kinds
        .iter()
        .map(|kind| write_report(*kind, records, dir))
        .collect()
}

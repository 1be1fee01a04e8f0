//! Comparison-count experiments
//!
//! The harness drives [`BinomialHeap`]s through a fixed script and records how
//! many key comparisons each operation costs, so the O(log n) bounds can be
//! checked against measured numbers.
//!
//! ## The single-run script
//!
//! 1. create two empty heaps on one arena (recorded as two zero-cost
//!    `MakeHeap` entries)
//! 2. insert n random keys into each, in the chosen [`FillOrder`]
//! 3. meld the second heap into the first
//! 4. extract the minimum 2n times
//!
//! [`run_single`] fills the first heap completely before the second, which
//! keeps the per-operation CSV grouped by heap. [`run_sweep`] and
//! [`run_trials`] alternate inserts between the heaps. The fill order changes
//! which random key lands in which heap, so totals for one seed differ between
//! the two orders.
//!
//! The run fails if the extracted sequence ever decreases, if the heap runs
//! dry early, or if it is not empty at the end. All heaps share one
//! [`ComparisonCounter`], and each operation's cost is the difference of two
//! snapshots taken around it.
//!
//! ## CSV layouts
//!
//! - per-operation costs: `Operation,Comparisons`, operations numbered from 1
//! - size sweep: `N,TotalComparisons,AveragePerOperation,TheoreticalLogN`

use std::fmt;
use std::io::{self, Write};
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::binomial::BinomialHeap;
use crate::compare::ComparisonCounter;

/// Failure of an experiment run
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("extract-min #{index} returned {found} after {previous}")]
    OutOfOrder { index: usize, previous: i32, found: i32 },
    #[error("heap ran dry after {extracted} of {expected} extractions")]
    Exhausted { extracted: usize, expected: usize },
    #[error("heap still holds {remaining} keys after draining")]
    NotEmpty { remaining: usize },
    #[error("failed to write results")]
    Io(#[from] io::Error),
}

/// Settings shared by the experiment drivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentConfig {
    /// Keys inserted into each of the two heaps
    pub n: usize,
    /// Independent repetitions
    pub runs: usize,
    /// Smallest generated key
    pub key_min: i32,
    /// Largest generated key
    pub key_max: i32,
    /// Fixed seed for reproducible runs; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n: 500,
            runs: 5,
            key_min: 1,
            key_max: 100_000,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    pub fn key_range(&self) -> RangeInclusive<i32> {
        self.key_min..=self.key_max
    }

    /// Random source for this configuration.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Operation recorded in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    MakeHeap,
    Insert,
    Union,
    ExtractMin,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::MakeHeap => "make-heap",
            OperationKind::Insert => "insert",
            OperationKind::Union => "union",
            OperationKind::ExtractMin => "extract-min",
        };
        f.write_str(name)
    }
}

/// How the two heaps of a run receive their keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillOrder {
    /// n inserts into the first heap, then n into the second
    #[default]
    Sequential,
    /// one insert into each heap per step, first heap first
    Interleaved,
}

/// Comparisons made by one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationCost {
    pub kind: OperationKind,
    pub comparisons: u64,
}

/// Outcome of one scripted run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub n: usize,
    /// Per-operation costs in execution order
    pub costs: Vec<OperationCost>,
    /// Keys in extraction order
    pub extracted: Vec<i32>,
}

impl RunRecord {
    pub fn total_comparisons(&self) -> u64 {
        self.costs.iter().map(|cost| cost.comparisons).sum()
    }

    /// Largest single-operation cost of the given kind.
    pub fn max_cost(&self, kind: OperationKind) -> Option<u64> {
        self.costs
            .iter()
            .filter(|cost| cost.kind == kind)
            .map(|cost| cost.comparisons)
            .max()
    }
}

/// Number of operations in a run of size `n`: two make-heaps, 2n inserts, one
/// union and 2n extractions.
pub fn operation_count(n: usize) -> usize {
    2 + 2 * n + 1 + 2 * n
}

/// Runs the single-run script with `n` keys per heap drawn from `keys`,
/// filling the heaps one after the other.
pub fn run_single<R: Rng>(
    n: usize,
    keys: RangeInclusive<i32>,
    rng: &mut R,
) -> Result<RunRecord, ExperimentError> {
    run_script(n, keys, rng, FillOrder::Sequential)
}

/// Runs the single-run script with the heaps filled in `order`.
///
/// Insert costs are recorded in execution order, so with
/// [`FillOrder::Interleaved`] they alternate between the two heaps.
pub fn run_script<R: Rng>(
    n: usize,
    keys: RangeInclusive<i32>,
    rng: &mut R,
    order: FillOrder,
) -> Result<RunRecord, ExperimentError> {
    let counter = ComparisonCounter::new();
    let mut costs = Vec::with_capacity(operation_count(n));
    let mut record = |kind, comparisons| costs.push(OperationCost { kind, comparisons });

    let (mut first, cost) = counter.measure(|| BinomialHeap::with_comparator(counter.clone()));
    record(OperationKind::MakeHeap, cost);
    let (mut second, cost) = counter.measure(|| first.new_sibling());
    record(OperationKind::MakeHeap, cost);

    let mut insert = |heap: &mut BinomialHeap<i32, ComparisonCounter>| {
        let key = rng.gen_range(keys.clone());
        let ((), cost) = counter.measure(|| heap.insert(key));
        record(OperationKind::Insert, cost);
    };
    match order {
        FillOrder::Sequential => {
            for heap in [&mut first, &mut second] {
                for _ in 0..n {
                    insert(heap);
                }
            }
        }
        FillOrder::Interleaved => {
            for _ in 0..n {
                insert(&mut first);
                insert(&mut second);
            }
        }
    }

    let (mut heap, cost) = counter.measure(|| first.union(second));
    record(OperationKind::Union, cost);

    let expected = 2 * n;
    let mut extracted = Vec::with_capacity(expected);
    for index in 1..=expected {
        let (key, cost) = counter.measure(|| heap.extract_min());
        record(OperationKind::ExtractMin, cost);
        let Some(key) = key else {
            warn!(n, extracted = index - 1, "heap ran dry");
            return Err(ExperimentError::Exhausted {
                extracted: index - 1,
                expected,
            });
        };
        if let Some(&previous) = extracted.last() {
            if key < previous {
                warn!(n, index, previous, key, "extraction order broken");
                return Err(ExperimentError::OutOfOrder {
                    index,
                    previous,
                    found: key,
                });
            }
        }
        extracted.push(key);
    }

    if !heap.is_empty() {
        return Err(ExperimentError::NotEmpty {
            remaining: heap.len(),
        });
    }

    debug!(n, total = counter.get(), "run complete");
    Ok(RunRecord {
        n,
        costs,
        extracted,
    })
}

/// Writes per-operation costs as `Operation,Comparisons`.
pub fn write_operation_costs<W: Write>(
    mut out: W,
    costs: &[OperationCost],
) -> Result<(), ExperimentError> {
    writeln!(out, "Operation,Comparisons")?;
    for (index, cost) in costs.iter().enumerate() {
        writeln!(out, "{},{}", index + 1, cost.comparisons)?;
    }
    out.flush()?;
    Ok(())
}

/// One line of the size sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRow {
    pub n: usize,
    pub total_comparisons: u64,
    pub average_per_operation: f64,
    pub theoretical_log_n: f64,
}

impl SweepRow {
    pub fn from_run(run: &RunRecord) -> Self {
        let total_comparisons = run.total_comparisons();
        Self {
            n: run.n,
            total_comparisons,
            average_per_operation: total_comparisons as f64 / operation_count(run.n) as f64,
            theoretical_log_n: (run.n as f64).log2(),
        }
    }
}

/// 100 to 1000 in steps of 100, then 2000 to 10000 in steps of 1000.
pub fn default_sweep_sizes() -> Vec<usize> {
    (100..=1000)
        .step_by(100)
        .chain((2000..=10_000).step_by(1000))
        .collect()
}

/// Runs the single-run script once per size, with interleaved inserts.
pub fn run_sweep<R: Rng>(
    sizes: &[usize],
    keys: RangeInclusive<i32>,
    rng: &mut R,
) -> Result<Vec<SweepRow>, ExperimentError> {
    sizes
        .iter()
        .map(|&n| {
            let run = run_script(n, keys.clone(), rng, FillOrder::Interleaved)?;
            let row = SweepRow::from_run(&run);
            info!(
                n,
                total = row.total_comparisons,
                average = row.average_per_operation,
                "sweep point"
            );
            Ok(row)
        })
        .collect()
}

/// Writes sweep rows as `N,TotalComparisons,AveragePerOperation,TheoreticalLogN`.
pub fn write_sweep<W: Write>(mut out: W, rows: &[SweepRow]) -> Result<(), ExperimentError> {
    writeln!(out, "N,TotalComparisons,AveragePerOperation,TheoreticalLogN")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{:.4},{:.4}",
            row.n, row.total_comparisons, row.average_per_operation, row.theoretical_log_n
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Spread of total comparisons across repeated runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSummary {
    pub trials: usize,
    pub mean: f64,
    pub min: u64,
    pub max: u64,
}

impl TrialSummary {
    /// Summarizes run totals; `None` for an empty slice.
    pub fn from_totals(totals: &[u64]) -> Option<Self> {
        let min = *totals.iter().min()?;
        let max = *totals.iter().max()?;
        let mean = totals.iter().sum::<u64>() as f64 / totals.len() as f64;
        Some(Self {
            trials: totals.len(),
            mean,
            min,
            max,
        })
    }

    /// `max - min` as a percentage of the mean.
    pub fn spread_percent(&self) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        100.0 * (self.max - self.min) as f64 / self.mean
    }
}

/// Repeats the single-run script `trials` times at size `n`, with interleaved
/// inserts.
pub fn run_trials<R: Rng>(
    n: usize,
    trials: usize,
    keys: RangeInclusive<i32>,
    rng: &mut R,
) -> Result<Option<TrialSummary>, ExperimentError> {
    let totals = (0..trials)
        .map(|_| {
            run_script(n, keys.clone(), rng, FillOrder::Interleaved)
                .map(|run| run.total_comparisons())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TrialSummary::from_totals(&totals))
}

/// Per-operation costs of a deterministic insert-then-extract sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationProfile {
    pub insert_costs: Vec<u64>,
    pub extract_costs: Vec<u64>,
}

/// Inserts keys `1..=inserts` in ascending order, then extracts the minimum
/// `extracts` times, recording each operation's comparisons.
pub fn operation_profile(inserts: u32, extracts: usize) -> OperationProfile {
    let counter = ComparisonCounter::new();
    let mut heap = BinomialHeap::with_comparator(counter.clone());

    let insert_costs = (1..=inserts)
        .map(|key| counter.measure(|| heap.insert(key)).1)
        .collect();
    let extract_costs = (0..extracts)
        .map(|_| counter.measure(|| heap.extract_min()).1)
        .collect();

    OperationProfile {
        insert_costs,
        extract_costs,
    }
}

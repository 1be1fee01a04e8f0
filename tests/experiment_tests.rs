//! Tests for the experiment harness

use rand::rngs::StdRng;
use rand::SeedableRng;

use binomial_lab::experiment::{
    self, ExperimentConfig, FillOrder, OperationCost, OperationKind, RunRecord, SweepRow,
    TrialSummary,
};

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn costs_of(record: &RunRecord, kind: OperationKind) -> Vec<u64> {
    record
        .costs
        .iter()
        .filter(|cost| cost.kind == kind)
        .map(|cost| cost.comparisons)
        .collect()
}

#[test]
fn test_config_defaults() {
    let config = ExperimentConfig::default();
    assert_eq!(config.n, 500);
    assert_eq!(config.runs, 5);
    assert_eq!(config.key_range(), 1..=100_000);
    assert_eq!(config.seed, None);
}

#[test]
fn test_operation_count() {
    assert_eq!(experiment::operation_count(0), 3);
    assert_eq!(experiment::operation_count(4), 19);
    assert_eq!(experiment::operation_count(500), 2003);
}

#[test]
fn test_single_run_script() {
    let record = experiment::run_single(4, 1..=100, &mut seeded(1)).unwrap();
    assert_eq!(record.n, 4);
    assert_eq!(record.costs.len(), 19);

    let kinds: Vec<OperationKind> = record.costs.iter().map(|cost| cost.kind).collect();
    assert_eq!(&kinds[..2], &[OperationKind::MakeHeap; 2]);
    assert!(kinds[2..10].iter().all(|&kind| kind == OperationKind::Insert));
    assert_eq!(kinds[10], OperationKind::Union);
    assert!(kinds[11..].iter().all(|&kind| kind == OperationKind::ExtractMin));

    assert_eq!(costs_of(&record, OperationKind::MakeHeap), vec![0, 0]);
    // each heap of four costs 0, 1, 0, 2 whatever the keys
    assert_eq!(
        costs_of(&record, OperationKind::Insert),
        vec![0, 1, 0, 2, 0, 1, 0, 2]
    );
    // B2 + B2 is one link
    assert_eq!(costs_of(&record, OperationKind::Union), vec![1]);
    // the melded heap is a single B3
    assert_eq!(costs_of(&record, OperationKind::ExtractMin)[0], 0);

    assert_eq!(record.extracted.len(), 8);
    assert!(record.extracted.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(record.extracted.iter().all(|key| (1..=100).contains(key)));
    assert_eq!(
        record.total_comparisons(),
        record.costs.iter().map(|cost| cost.comparisons).sum::<u64>()
    );
}

#[test]
fn test_single_run_empty() {
    let record = experiment::run_single(0, 1..=10, &mut seeded(3)).unwrap();
    assert_eq!(record.costs.len(), 3);
    assert_eq!(record.total_comparisons(), 0);
    assert!(record.extracted.is_empty());
    assert_eq!(record.max_cost(OperationKind::ExtractMin), None);
}

#[test]
fn test_single_run_narrow_key_range() {
    // every key equal
    let record = experiment::run_single(50, 7..=7, &mut seeded(9)).unwrap();
    assert_eq!(record.extracted, vec![7; 100]);
}

#[test]
fn test_seeded_runs_reproduce() {
    let first = experiment::run_single(200, 1..=100_000, &mut seeded(42)).unwrap();
    let second = experiment::run_single(200, 1..=100_000, &mut seeded(42)).unwrap();
    assert_eq!(first.costs, second.costs);
    assert_eq!(first.extracted, second.extracted);
}

#[test]
fn test_config_rng_uses_seed() {
    let config = ExperimentConfig {
        n: 64,
        seed: Some(11),
        ..ExperimentConfig::default()
    };
    let a = experiment::run_single(config.n, config.key_range(), &mut config.rng()).unwrap();
    let b = experiment::run_single(config.n, config.key_range(), &mut config.rng()).unwrap();
    assert_eq!(a.extracted, b.extracted);
}

#[test]
fn test_max_cost_is_logarithmic() {
    let n = 500;
    let record = experiment::run_single(n, 1..=100_000, &mut seeded(5)).unwrap();
    let bits = u64::from(usize::BITS - (2 * n).leading_zeros());
    let max_insert = record.max_cost(OperationKind::Insert).unwrap();
    let max_extract = record.max_cost(OperationKind::ExtractMin).unwrap();
    assert!(max_insert <= bits, "insert {max_insert}");
    assert!(max_extract <= 2 * bits, "extract {max_extract}");
}

#[test]
fn test_write_operation_costs() {
    let costs = [
        OperationCost {
            kind: OperationKind::MakeHeap,
            comparisons: 0,
        },
        OperationCost {
            kind: OperationKind::Insert,
            comparisons: 2,
        },
        OperationCost {
            kind: OperationKind::ExtractMin,
            comparisons: 5,
        },
    ];
    let mut out = Vec::new();
    experiment::write_operation_costs(&mut out, &costs).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Operation,Comparisons\n1,0\n2,2\n3,5\n"
    );
}

#[test]
fn test_write_operation_costs_for_a_run() {
    let record = experiment::run_single(10, 1..=1000, &mut seeded(8)).unwrap();
    let mut out = Vec::new();
    experiment::write_operation_costs(&mut out, &record.costs).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + experiment::operation_count(10));
    assert_eq!(lines[0], "Operation,Comparisons");
    assert_eq!(lines[1], "1,0");
    assert!(lines[lines.len() - 1].starts_with("43,"));
}

#[test]
fn test_default_sweep_sizes() {
    let sizes = experiment::default_sweep_sizes();
    assert_eq!(sizes.len(), 19);
    assert_eq!(sizes[0], 100);
    assert_eq!(sizes[9], 1000);
    assert_eq!(sizes[10], 2000);
    assert_eq!(sizes[18], 10_000);
}

#[test]
fn test_sweep_row_from_run() {
    let record = experiment::run_single(64, 1..=1000, &mut seeded(2)).unwrap();
    let row = SweepRow::from_run(&record);
    assert_eq!(row.n, 64);
    assert_eq!(row.total_comparisons, record.total_comparisons());
    assert_eq!(row.theoretical_log_n, 6.0);
    let expected = record.total_comparisons() as f64 / 259.0;
    assert!((row.average_per_operation - expected).abs() < 1e-12);
}

#[test]
fn test_run_sweep() {
    let rows = experiment::run_sweep(&[10, 20, 40], 1..=1000, &mut seeded(4)).unwrap();
    let ns: Vec<usize> = rows.iter().map(|row| row.n).collect();
    assert_eq!(ns, vec![10, 20, 40]);
    assert!(rows.iter().all(|row| row.total_comparisons > 0));
}

#[test]
fn test_interleaved_fill_alternates_heaps() {
    let record =
        experiment::run_script(4, 1..=100, &mut seeded(1), FillOrder::Interleaved).unwrap();
    assert_eq!(record.costs.len(), 19);
    // each heap still pays 0, 1, 0, 2, one insert at a time in turn
    assert_eq!(
        costs_of(&record, OperationKind::Insert),
        vec![0, 0, 1, 1, 0, 0, 2, 2]
    );
    assert_eq!(costs_of(&record, OperationKind::Union), vec![1]);
    assert!(record.extracted.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_sequential_fill_is_the_single_run() {
    let single = experiment::run_single(30, 1..=1000, &mut seeded(12)).unwrap();
    let script =
        experiment::run_script(30, 1..=1000, &mut seeded(12), FillOrder::Sequential).unwrap();
    assert_eq!(single.costs, script.costs);
    assert_eq!(single.extracted, script.extracted);
    assert_eq!(FillOrder::default(), FillOrder::Sequential);
}

#[test]
fn test_sweep_and_trials_fill_interleaved() {
    let run =
        experiment::run_script(150, 1..=100_000, &mut seeded(21), FillOrder::Interleaved).unwrap();

    let rows = experiment::run_sweep(&[150], 1..=100_000, &mut seeded(21)).unwrap();
    assert_eq!(rows[0].total_comparisons, run.total_comparisons());

    let summary = experiment::run_trials(150, 1, 1..=100_000, &mut seeded(21))
        .unwrap()
        .unwrap();
    assert_eq!(summary.min, run.total_comparisons());
}

#[test]
fn test_write_sweep() {
    let rows = [SweepRow {
        n: 100,
        total_comparisons: 1234,
        average_per_operation: 3.0,
        theoretical_log_n: 0.5,
    }];
    let mut out = Vec::new();
    experiment::write_sweep(&mut out, &rows).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "N,TotalComparisons,AveragePerOperation,TheoreticalLogN\n100,1234,3.0000,0.5000\n"
    );
}

#[test]
fn test_trial_summary() {
    let summary = TrialSummary::from_totals(&[90, 100, 110]).unwrap();
    assert_eq!(summary.trials, 3);
    assert_eq!(summary.mean, 100.0);
    assert_eq!(summary.min, 90);
    assert_eq!(summary.max, 110);
    assert_eq!(summary.spread_percent(), 20.0);

    assert_eq!(TrialSummary::from_totals(&[]), None);
    let zero = TrialSummary::from_totals(&[0, 0]).unwrap();
    assert_eq!(zero.spread_percent(), 0.0);
}

#[test]
fn test_run_trials() {
    let summary = experiment::run_trials(100, 4, 1..=100_000, &mut seeded(6))
        .unwrap()
        .unwrap();
    assert_eq!(summary.trials, 4);
    assert!(summary.min as f64 <= summary.mean);
    assert!(summary.mean <= summary.max as f64);

    let none = experiment::run_trials(100, 0, 1..=100_000, &mut seeded(6)).unwrap();
    assert_eq!(none, None);
}

#[test]
fn test_operation_profile() {
    let profile = experiment::operation_profile(16, 8);
    assert_eq!(
        profile.insert_costs,
        vec![0, 1, 0, 2, 0, 1, 0, 3, 0, 1, 0, 2, 0, 1, 0, 4]
    );
    assert_eq!(profile.extract_costs.len(), 8);
    // sixteen keys form one B4
    assert_eq!(profile.extract_costs[0], 0);
}

#[test]
fn test_operation_kind_display() {
    assert_eq!(OperationKind::MakeHeap.to_string(), "make-heap");
    assert_eq!(OperationKind::ExtractMin.to_string(), "extract-min");
}

//! Property-Based Tests for the Cache Engine
//!
//! Uses proptest to verify the correctness properties of the merge and trim
//! engines and the stability of request fingerprints.

use proptest::prelude::*;

use crate::cache::{request_cache_key, target_signature};
use crate::models::{QueryRequest, SortOrder, Target, TimeRange};
use crate::table::{merge_tables, trim_table, RowTable, ValueColumn};

// == Strategies ==
/// Strictly increasing timestamp columns.
fn sorted_times(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..10_000, 0..max_len).prop_map(|deltas| {
        let mut now = 0i64;
        deltas
            .iter()
            .map(|delta| {
                now += delta;
                now
            })
            .collect()
    })
}

/// Builds a one-column table whose value at each row is derived from its
/// timestamp, so row alignment can be checked after any slicing.
fn table_for(times: &[i64]) -> RowTable {
    let mut table = RowTable::new("A").with_column(ValueColumn::new("value"));
    for &time in times {
        table.push_row(time, &[time as f64 * 0.5]);
    }
    table
}

fn rows_aligned(table: &RowTable) -> bool {
    table.columns.iter().all(|c| c.values.len() == table.len())
        && table
            .times
            .iter()
            .zip(&table.columns[0].values)
            .all(|(&t, &v)| v == t as f64 * 0.5)
}

fn target_strategy() -> impl Strategy<Value = Target> {
    (
        "[A-Z]{1,2}",
        "[a-z/]{1,12}",
        prop::option::of("[a-z]{1,6}"),
        prop::option::of("[0-9]{1,2}[smh]"),
        prop::option::of(1u64..10_000),
    )
        .prop_map(|(ref_id, channel, aggregate, resolution, max_rows)| {
            let mut target = Target::new(ref_id, channel);
            target.aggregate = aggregate;
            target.resolution = resolution;
            target.max_rows = max_rows;
            target
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property: disjoint merge is concatenation**
    // *For any* sorted tables A and B where B starts after A ends, the merge
    // is exactly concat(A, B) and every column stays row-aligned.
    #[test]
    fn prop_merge_after_equals_concat(
        a_times in sorted_times(30),
        b_deltas in prop::collection::vec(1i64..10_000, 1..30),
        gap in 1i64..10_000,
    ) {
        let a = table_for(&a_times);
        let start = a_times.last().copied().unwrap_or(0) + gap;
        let mut now = start;
        let b_times: Vec<i64> = b_deltas.iter().map(|d| { let t = now; now += d; t }).collect();
        let b = table_for(&b_times);

        let merged = merge_tables(&a, &b, SortOrder::Ascending);
        prop_assert_eq!(&merged, &a.concat(&b));
        prop_assert!(rows_aligned(&merged));
    }

    // **Property: covering merge returns the fresh table**
    // *For any* table B and any sub-slice A of it, merging A with B yields B.
    #[test]
    fn prop_merge_subsumed_returns_fresh(
        b_times in sorted_times(30),
        split in any::<(prop::sample::Index, prop::sample::Index)>(),
    ) {
        prop_assume!(!b_times.is_empty());
        let lo = split.0.index(b_times.len());
        let hi = split.1.index(b_times.len());
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

        let fresh = table_for(&b_times);
        let cached = fresh.slice_rows(lo..hi + 1);

        let merged = merge_tables(&cached, &fresh, SortOrder::Ascending);
        prop_assert_eq!(merged, fresh);
    }

    // **Property: tail merge keeps time strictly increasing**
    // *For any* cached table and fresh table covering its tail or beyond,
    // the merge is strictly increasing - no duplicate timestamp at the seam -
    // and ends where the fresh table ends.
    #[test]
    fn prop_merge_tail_has_unique_seam(
        a_times in sorted_times(30),
        b_offset in 0usize..30,
        b_deltas in prop::collection::vec(1i64..10_000, 1..30),
    ) {
        prop_assume!(!a_times.is_empty());
        // Fresh rows start somewhere inside or after the cached span and
        // always reach past its end
        let start = a_times[b_offset.min(a_times.len() - 1)];
        let mut now = start;
        let mut b_times = vec![start];
        for delta in &b_deltas {
            now += delta;
            b_times.push(now);
        }
        prop_assume!(*b_times.last().unwrap() >= *a_times.last().unwrap());

        let merged = merge_tables(
            &table_for(&a_times),
            &table_for(&b_times),
            SortOrder::Ascending,
        );
        prop_assert!(merged.times.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(merged.last_time(), Some(*b_times.last().unwrap()));
        prop_assert!(rows_aligned(&merged));
    }

    // **Property: trim keeps exactly the in-bound rows**
    // *For any* table and bounds, the trimmed table holds exactly the rows
    // with from <= time <= to, and trimming twice changes nothing.
    #[test]
    fn prop_trim_is_exact_and_idempotent(
        times in sorted_times(40),
        bounds in any::<(i64, i64)>(),
    ) {
        let (from, to) = if bounds.0 <= bounds.1 { bounds } else { (bounds.1, bounds.0) };
        let from = from.rem_euclid(500_000);
        let to = from + (to.rem_euclid(500_000));

        let table = table_for(&times);
        let trimmed = trim_table(&table, from, to, SortOrder::Ascending);

        let expected: Vec<i64> = times
            .iter()
            .copied()
            .filter(|&t| from <= t && t <= to)
            .collect();
        prop_assert_eq!(&trimmed.times, &expected);
        prop_assert!(rows_aligned(&trimmed));

        let again = trim_table(&trimmed, from, to, SortOrder::Ascending);
        prop_assert_eq!(again, trimmed);
    }

    // **Property: disjoint trim preserves column shape**
    // *For any* non-empty table, trimming to a window past its newest row
    // yields zero rows but the same column count.
    #[test]
    fn prop_trim_disjoint_keeps_columns(times in sorted_times(40)) {
        prop_assume!(!times.is_empty());
        let table = table_for(&times);
        let past_end = times.last().unwrap() + 1;

        let trimmed = trim_table(&table, past_end, past_end + 1_000, SortOrder::Ascending);
        prop_assert!(trimmed.is_empty());
        prop_assert_eq!(trimmed.columns.len(), table.columns.len());
    }

    // **Property: composite keys ignore target order**
    // *For any* target set, rotating the target array never changes the
    // composite cache key, and the per-target signatures are unaffected.
    #[test]
    fn prop_cache_key_order_independent(
        targets in prop::collection::vec(target_strategy(), 1..6),
        rotation in 0usize..6,
    ) {
        let request = QueryRequest {
            request_id: "r1".to_string(),
            panel_id: 0,
            range: TimeRange::new(0, 3_600_000, "now-1h", "now"),
            interval_ms: 1000,
            targets: targets.clone(),
        };

        let mut rotated_targets = targets.clone();
        rotated_targets.rotate_left(rotation % targets.len().max(1));
        let rotated = QueryRequest { targets: rotated_targets, ..request.clone() };

        let key = request_cache_key(&request);
        prop_assert_eq!(&key, &request_cache_key(&rotated));
        for target in &targets {
            // Every target's signature participates in the key
            prop_assert!(key.contains(&target_signature(target)));
        }
    }
}

//! # Selection Scenario Suite
//!
//! End-to-end checks of `Selector::select` against in-memory and scripted
//! sources: mode choice, the single widened fetch, snapping, ordering, limits
//! and error pass-through.

use async_trait::async_trait;
use location_selector_lib::condition::{Condition, SortOrder};
use location_selector_lib::selector::{BuildSelectedSlots, Selector};
use location_selector_lib::source::{soft_fetch_limit, InMemorySource, SampleSource, SourceError};
use location_selector_lib::{LocationSample, Slot};
use std::sync::{Arc, Mutex};

/// Source that records every range it is asked for.
#[derive(Default)]
struct RecordingSource {
    inner: InMemorySource,
    calls: Mutex<Vec<(i64, i64)>>,
}

impl RecordingSource {
    fn new(samples: Vec<LocationSample>) -> Self {
        Self {
            inner: InMemorySource::new(samples).unwrap(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(i64, i64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SampleSource for RecordingSource {
    async fn find_between(
        &self,
        from_inclusive: i64,
        to_exclusive: i64,
    ) -> Result<Vec<LocationSample>, SourceError> {
        self.calls.lock().unwrap().push((from_inclusive, to_exclusive));
        self.inner.find_between(from_inclusive, to_exclusive).await
    }
}

/// Source whose backend is always down.
struct FailingSource;

#[async_trait]
impl SampleSource for FailingSource {
    async fn find_between(&self, _: i64, _: i64) -> Result<Vec<LocationSample>, SourceError> {
        Err(SourceError::Unavailable("database closed".to_string()))
    }
}

/// Source that never answers.
struct StalledSource {
    started: Mutex<bool>,
}

#[async_trait]
impl SampleSource for StalledSource {
    async fn find_between(&self, _: i64, _: i64) -> Result<Vec<LocationSample>, SourceError> {
        *self.started.lock().unwrap() = true;
        std::future::pending().await
    }
}

fn fix(t: i64, acc: f32) -> LocationSample {
    LocationSample::at(t, acc)
}

fn fixes(times: &[i64]) -> Vec<LocationSample> {
    times.iter().map(|&t| fix(t, 3.0)).collect()
}

fn selector(samples: Vec<LocationSample>) -> Selector<RecordingSource> {
    Selector::new(RecordingSource::new(samples))
}

fn matched(slots: &[Slot]) -> Vec<Option<i64>> {
    slots
        .iter()
        .map(|s| s.sample.as_ref().map(|x| x.time_millis))
        .collect()
}

fn ideals(slots: &[Slot]) -> Vec<i64> {
    slots.iter().map(|s| s.ideal_ms).collect()
}

#[tokio::test]
async fn single_instant_window_in_direct_mode() {
    let sel = selector(vec![fix(1_000, 5.0)]);
    let cond = Condition {
        from_millis: Some(1_000),
        to_millis: Some(1_000),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(slots, vec![Slot::matched(1_000, fix(1_000, 5.0))]);
    assert_eq!(slots[0].delta_ms, Some(0));
    assert_eq!(sel.source().calls(), vec![(1_000, 1_001)]);
}

#[tokio::test]
async fn grid_matches_nearest_and_marks_gaps() {
    let sel = selector(fixes(&[100, 4_800]));
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(10_000),
        interval_sec: Some(5),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(ideals(&slots), vec![0, 5_000, 10_000]);
    assert_eq!(matched(&slots), vec![Some(100), Some(4_800), None]);
    assert_eq!(slots[0].delta_ms, Some(100));
    assert_eq!(slots[1].delta_ms, Some(-200));
    assert_eq!(slots[2].delta_ms, None);
    assert_eq!(sel.source().calls(), vec![(-2_500, 12_501)]);
}

#[tokio::test]
async fn newest_first_limit_keeps_latest_direct_rows() {
    let sel = selector(fixes(&[10, 20, 30, 40, 50]));
    let cond = Condition {
        limit: Some(2),
        order: SortOrder::NewestFirst,
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(matched(&slots), vec![Some(50), Some(40)]);
    assert_eq!(sel.source().calls(), vec![(i64::MIN, i64::MAX)]);
}

#[tokio::test]
async fn accuracy_floor_drops_worse_samples() {
    let sel = selector(vec![fix(1, 5.0), fix(2, 15.0), fix(3, 8.0)]);
    let cond = Condition {
        min_accuracy: Some(10.0),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    let accs: Vec<f32> = slots
        .iter()
        .filter_map(|s| s.sample.as_ref().map(|x| x.accuracy))
        .collect();
    assert_eq!(accs, vec![5.0, 8.0]);
}

#[tokio::test]
async fn interval_without_upper_bound_falls_back_to_direct() {
    let sel = selector(fixes(&[1_000, 1_500, 60_000]));
    let cond = Condition {
        from_millis: Some(1_000),
        interval_sec: Some(10),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(ideals(&slots), vec![1_000, 1_500, 60_000]);
    assert!(slots.iter().all(|s| s.delta_ms == Some(0)));
    assert_eq!(sel.source().calls(), vec![(1_000, i64::MAX)]);
}

#[tokio::test]
async fn direct_mode_maps_fetch_one_to_one() {
    let samples = fixes(&[5, 5, 9, 12]);
    let sel = selector(samples.clone());

    let oldest = sel.select(&Condition::default()).await.unwrap();
    assert_eq!(matched(&oldest), vec![Some(5), Some(5), Some(9), Some(12)]);

    let newest = sel
        .select(&Condition {
            order: SortOrder::NewestFirst,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(matched(&newest), vec![Some(12), Some(9), Some(5), Some(5)]);
    assert!(newest.iter().all(|s| s.delta_ms == Some(0)));
}

#[tokio::test]
async fn reversed_bounds_select_the_same_window() {
    let samples = fixes(&[0, 1_000, 2_000, 3_000]);
    let sel = selector(samples);
    let forward = Condition {
        from_millis: Some(1_000),
        to_millis: Some(2_000),
        ..Default::default()
    };
    let reversed = Condition {
        from_millis: Some(2_000),
        to_millis: Some(1_000),
        ..Default::default()
    };

    let a = sel.select(&forward).await.unwrap();
    let b = sel.select(&reversed).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(matched(&a), vec![Some(1_000), Some(2_000)]);
}

#[tokio::test]
async fn grid_length_matches_instant_count_even_when_empty() {
    let sel = selector(Vec::new());
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(59_999),
        interval_sec: Some(10),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(ideals(&slots), vec![0, 10_000, 20_000, 30_000, 40_000, 50_000]);
    assert!(slots.iter().all(Slot::is_gap));
}

#[tokio::test]
async fn empty_direct_fetch_is_not_an_error() {
    let sel = selector(Vec::new());
    assert!(sel.select(&Condition::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn grid_newest_first_limit_counts_gaps() {
    // Instants 0..=50s every 10s; samples only near 0s and 40s
    let sel = selector(fixes(&[200, 39_000]));
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(50_000),
        interval_sec: Some(10),
        limit: Some(3),
        order: SortOrder::NewestFirst,
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(ideals(&slots), vec![50_000, 40_000, 30_000]);
    assert_eq!(matched(&slots), vec![None, Some(39_000), None]);
}

#[tokio::test]
async fn grid_oldest_first_limit_takes_earliest_instants() {
    let sel = selector(fixes(&[0, 10_000, 20_000]));
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(40_000),
        interval_sec: Some(10),
        limit: Some(2),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(ideals(&slots), vec![0, 10_000]);
}

#[tokio::test]
async fn grid_sees_candidates_just_outside_the_window() {
    // W = 2.5s: a fix 2.5s before `from` still matches the first instant
    let sel = selector(fixes(&[7_500, 22_500]));
    let cond = Condition {
        from_millis: Some(10_000),
        to_millis: Some(20_000),
        interval_sec: Some(5),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(matched(&slots), vec![Some(7_500), None, Some(22_500)]);
    assert_eq!(slots[0].delta_ms, Some(-2_500));
    assert_eq!(slots[2].delta_ms, Some(2_500));
}

#[tokio::test]
async fn grid_tie_prefers_older_sample() {
    let sel = selector(fixes(&[9_000, 11_000]));
    let cond = Condition {
        from_millis: Some(10_000),
        to_millis: Some(10_000),
        interval_sec: Some(4),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(matched(&slots), vec![Some(9_000)]);
}

#[tokio::test]
async fn grid_filters_accuracy_before_snapping() {
    // The closer fix is too imprecise, so the farther one fills the slot
    let sel = selector(vec![fix(9_800, 3.0), fix(10_050, 40.0)]);
    let cond = Condition {
        from_millis: Some(10_000),
        to_millis: Some(10_000),
        interval_sec: Some(1),
        min_accuracy: Some(20.0),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(matched(&slots), vec![Some(9_800)]);
    assert_eq!(slots[0].delta_ms, Some(-200));
}

#[tokio::test]
async fn zero_interval_is_floored_to_one_second() {
    let sel = selector(fixes(&[0, 1_000, 2_000]));
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(2_000),
        interval_sec: Some(0),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(ideals(&slots), vec![0, 1_000, 2_000]);
    assert_eq!(sel.source().calls(), vec![(-500, 2_501)]);
}

#[tokio::test]
async fn non_positive_limit_means_unbounded() {
    let sel = selector(fixes(&[1, 2, 3]));
    for limit in [Some(0), Some(-4), None] {
        let cond = Condition {
            limit,
            ..Default::default()
        };
        assert_eq!(sel.select(&cond).await.unwrap().len(), 3);
    }
}

#[tokio::test]
async fn fetch_failure_propagates_unchanged() {
    let sel = Selector::new(FailingSource);

    let err = sel.select(&Condition::default()).await.unwrap_err();

    match err {
        SourceError::Unavailable(msg) => assert_eq!(msg, "database closed"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn dropping_a_pending_select_abandons_it() {
    let sel = Selector::new(StalledSource {
        started: Mutex::new(false),
    });
    let cond = Condition::default();

    let finished = tokio::select! {
        biased;
        _ = sel.select(&cond) => true,
        _ = async {} => false,
    };

    assert!(!finished);
    assert!(*sel.source().started.lock().unwrap());
}

#[tokio::test]
async fn shared_selector_serves_concurrent_calls() {
    let samples = fixes(&(0..100).map(|i| i * 1_000).collect::<Vec<_>>());
    let use_case = BuildSelectedSlots::new(Arc::new(Selector::new(
        InMemorySource::new(samples).unwrap(),
    )));

    let grid = Condition {
        from_millis: Some(0),
        to_millis: Some(99_000),
        interval_sec: Some(10),
        ..Default::default()
    };
    let direct = Condition {
        limit: Some(5),
        order: SortOrder::NewestFirst,
        ..Default::default()
    };

    let a = tokio::spawn({
        let uc = use_case.clone();
        async move { uc.run(&grid).await }
    });
    let b = tokio::spawn({
        let uc = use_case.clone();
        async move { uc.run(&direct).await }
    });

    let grid_rows = a.await.unwrap().unwrap();
    let direct_rows = b.await.unwrap().unwrap();

    assert_eq!(grid_rows.len(), 10);
    assert!(grid_rows.iter().all(|s| s.delta_ms == Some(0)));
    assert_eq!(
        matched(&direct_rows),
        vec![Some(99_000), Some(98_000), Some(97_000), Some(96_000), Some(95_000)]
    );
}

#[tokio::test]
async fn selection_is_deterministic() {
    let samples: Vec<LocationSample> = (0..50).map(|i| fix(i * 777, (i % 7) as f32)).collect();
    let sel = selector(samples);
    let cond = Condition {
        from_millis: Some(1_000),
        to_millis: Some(30_000),
        interval_sec: Some(2),
        min_accuracy: Some(4.0),
        order: SortOrder::NewestFirst,
        ..Default::default()
    };

    let first = sel.select(&cond).await.unwrap();
    let second = sel.select(&cond).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(sel.source().calls().len(), 2);
}

#[tokio::test]
async fn oversized_grid_fetch_is_never_truncated() {
    // 2,001 fixes every 10 ms, well past the 1,000-row soft limit
    let times: Vec<i64> = (0..=2_000).map(|i| i * 10).collect();
    assert!(times.len() > soft_fetch_limit(None));
    let sel = selector(fixes(&times));
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(20_000),
        interval_sec: Some(1),
        ..Default::default()
    };

    let slots = sel.select(&cond).await.unwrap();

    assert_eq!(slots.len(), 21);
    assert!(slots.iter().all(|s| s.delta_ms == Some(0)));
    assert_eq!(slots.last().map(|s| s.ideal_ms), Some(20_000));
}

#[tokio::test]
async fn capped_store_fails_instead_of_dropping_recent_rows() {
    let store = InMemorySource::new(fixes(&[10, 20, 30, 40, 50]))
        .unwrap()
        .with_max_rows(Some(2));
    let sel = Selector::new(store);
    let cond = Condition {
        limit: Some(2),
        order: SortOrder::NewestFirst,
        ..Default::default()
    };

    let err = sel.select(&cond).await.unwrap_err();

    assert!(matches!(
        err,
        SourceError::TooManyRows {
            found: 5,
            max_rows: 2
        }
    ));
}

#[tokio::test]
async fn capped_store_never_reports_fake_gaps() {
    let store = InMemorySource::new(fixes(&[0, 10_000, 20_000, 30_000]))
        .unwrap()
        .with_max_rows(Some(2));
    let sel = Selector::new(store);
    let cond = Condition {
        from_millis: Some(0),
        to_millis: Some(30_000),
        interval_sec: Some(10),
        ..Default::default()
    };

    assert!(matches!(
        sel.select(&cond).await,
        Err(SourceError::TooManyRows { .. })
    ));
}

#[tokio::test]
async fn grid_limit_matches_uncapped_grid_cut_down() {
    let samples: Vec<LocationSample> = (0..400).map(|i| fix(i * 613, 2.0)).collect();
    let sel = selector(samples);
    let base = Condition {
        from_millis: Some(0),
        to_millis: Some(240_000),
        interval_sec: Some(3),
        ..Default::default()
    };

    for order in [SortOrder::OldestFirst, SortOrder::NewestFirst] {
        let full = sel
            .select(&Condition {
                order,
                ..base.clone()
            })
            .await
            .unwrap();
        for limit in [1, 7, 80, 500] {
            let capped = sel
                .select(&Condition {
                    order,
                    limit: Some(limit),
                    ..base.clone()
                })
                .await
                .unwrap();
            let expected: Vec<Slot> = full.iter().take(limit as usize).cloned().collect();
            assert_eq!(capped, expected);
        }
    }
}

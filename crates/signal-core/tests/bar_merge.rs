//! 바 병합 속성 테스트

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use signal_core::{merge_bars, validate_series, Bar};

fn bar_at(minute: i64, close: f64) -> Bar {
    Bar::flat(Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(), close)
}

proptest! {
    #[test]
    fn merged_series_is_strictly_increasing(
        a in prop::collection::vec((0i64..200, 1.0f64..1000.0), 0..60),
        b in prop::collection::vec((0i64..200, 1.0f64..1000.0), 0..60),
    ) {
        let existing: Vec<Bar> = a.iter().map(|&(m, c)| bar_at(m, c)).collect();
        let incoming: Vec<Bar> = b.iter().map(|&(m, c)| bar_at(m, c)).collect();

        let merged = merge_bars(&existing, &incoming);

        prop_assert!(validate_series(&merged).is_ok());
    }

    #[test]
    fn incoming_values_win_on_duplicate(
        minutes in prop::collection::btree_set(0i64..500, 1..40),
    ) {
        let existing: Vec<Bar> = minutes.iter().map(|&m| bar_at(m, 1.0)).collect();
        let incoming: Vec<Bar> = minutes.iter().map(|&m| bar_at(m, 2.0)).collect();

        let merged = merge_bars(&existing, &incoming);

        prop_assert_eq!(merged.len(), minutes.len());
        prop_assert!(merged.iter().all(|b| b.close == 2.0));
    }
}

#[test]
fn merge_appends_new_tail() {
    let existing: Vec<Bar> = (0..5).map(|m| bar_at(m, m as f64)).collect();
    let incoming: Vec<Bar> = (5..8).map(|m| bar_at(m, m as f64)).collect();

    let merged = merge_bars(&existing, &incoming);

    assert_eq!(merged.len(), 8);
    assert_eq!(merged.last().unwrap().close, 7.0);
}

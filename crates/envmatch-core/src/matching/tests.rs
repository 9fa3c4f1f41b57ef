//! Tests for matching algorithm

use super::*;
use approx::assert_relative_eq;

fn collection(refs: &[(&str, &[f64])]) -> FingerprintCollection {
    refs.iter()
        .map(|(id, env)| Fingerprint::new(*id, env.to_vec()))
        .collect()
}

#[test]
fn test_matcher_basic() {
    let refs = collection(&[("video1", &[0.1, 0.2, 0.9, 0.3])]);
    let matcher = Matcher::new(&refs).unwrap();

    let query = Fingerprint::new("query", vec![0.9, 0.3]);
    let result = matcher.find_best(&query).unwrap().unwrap();

    assert_eq!(result.matched_id, "video1");
    assert_eq!(result.offset_seconds, 2);
    assert_eq!(result.cost, 0.0);
}

#[test]
fn test_silent_tie_prefers_earlier_reference() {
    let refs = collection(&[("video2", &[0.0, 0.0, 0.0]), ("video1", &[0.0, 0.0, 0.0])]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.0, 0.0]);

    for _ in 0..10 {
        let result = matcher.find_best(&query).unwrap().unwrap();
        assert_eq!(result.matched_id, "video1");
        assert_eq!(result.offset_seconds, 0);
        assert_eq!(result.cost, 0.0);
    }
}

#[test]
fn test_natural_order_decides_ties() {
    // video2 sorts before video10 even though it is inserted later
    let refs = collection(&[("video10", &[0.4, 0.4]), ("video2", &[0.4, 0.4])]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.4]);

    let result = matcher.find_best(&query).unwrap().unwrap();
    assert_eq!(result.matched_id, "video2");
    assert_eq!(result.offset_seconds, 0);
}

#[test]
fn test_smaller_offset_wins_within_reference() {
    let refs = collection(&[("video1", &[0.5, 0.1, 0.5, 0.1, 0.5])]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.5, 0.1]);

    let result = matcher.find_best(&query).unwrap().unwrap();
    assert_eq!(result.offset_seconds, 0);
    assert_eq!(result.cost, 0.0);
}

#[test]
fn test_lower_cost_beats_order() {
    let refs = collection(&[
        ("video1", &[0.9, 0.9, 0.9, 0.9]),
        ("video2", &[0.0, 0.3, 0.6, 0.2]),
    ]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.3, 0.5]);

    let result = matcher.find_best(&query).unwrap().unwrap();
    assert_eq!(result.matched_id, "video2");
    assert_eq!(result.offset_seconds, 1);
    assert_relative_eq!(result.cost, 0.1);
}

#[test]
fn test_float_noise_does_not_break_ties() {
    // |0.3 - 0.1| and |0.2 - 0.0| differ in binary floats but are both 2 tenths
    let refs = collection(&[("video1", &[0.1, 0.0]), ("video2", &[0.0, 0.1])]);
    let matcher = Matcher::new(&refs).unwrap();

    let query = Fingerprint::new("query", vec![0.3]);
    let result = matcher.find_best(&query).unwrap().unwrap();
    assert_eq!(result.matched_id, "video1");
    assert_eq!(result.offset_seconds, 0);
    assert_eq!(result.cost, 0.2);

    let query = Fingerprint::new("query", vec![0.2]);
    let result = matcher.find_best(&query).unwrap().unwrap();
    assert_eq!(result.matched_id, "video1");
    assert_eq!(result.offset_seconds, 0);
    assert_eq!(result.cost, 0.1);
}

#[test]
fn test_exact_self_match_at_every_offset() {
    let reference = [0.2, 0.7, 0.1, 0.9, 0.4, 0.4, 0.0, 1.0];
    let refs = collection(&[("video1", &reference)]);
    let matcher = Matcher::new(&refs).unwrap();

    for len in 1..=3 {
        for offset in 0..=(reference.len() - len) {
            let window = reference[offset..offset + len].to_vec();
            let result = matcher
                .find_best(&Fingerprint::new("query", window.clone()))
                .unwrap()
                .unwrap();
            assert_eq!(result.cost, 0.0);
            // A repeated window may also match earlier; it must match exactly there
            let hit = &reference[result.offset_seconds..result.offset_seconds + len];
            assert_eq!(hit, &window[..]);
            assert!(result.offset_seconds <= offset);
        }
    }
}

#[test]
fn test_query_longer_than_every_reference() {
    let refs = collection(&[("video1", &[0.1, 0.2]), ("video2", &[0.3, 0.4, 0.5])]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.1, 0.2, 0.3, 0.4]);

    assert_eq!(matcher.find_best(&query).unwrap(), None);
    assert!(matcher.rank(&query).unwrap().is_empty());
}

#[test]
fn test_short_references_are_skipped() {
    // video1 would be a perfect prefix match but is too short
    let refs = collection(&[("video1", &[0.5]), ("video2", &[0.9, 0.9, 0.9])]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.5, 0.5]);

    let result = matcher.find_best(&query).unwrap().unwrap();
    assert_eq!(result.matched_id, "video2");
    assert_relative_eq!(result.cost, 0.8);
}

#[test]
fn test_empty_query_is_invalid() {
    let refs = collection(&[("video1", &[0.1])]);
    let matcher = Matcher::new(&refs).unwrap();
    let err = matcher.find_best(&Fingerprint::new("query", vec![])).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = matcher.rank(&Fingerprint::new("query", vec![])).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_empty_collection_is_no_match() {
    let refs = FingerprintCollection::new();
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.1]);
    assert_eq!(matcher.find_best(&query).unwrap(), None);
}

#[test]
fn test_rank_orders_by_cost_then_collection() {
    let refs = collection(&[
        ("video1", &[0.9, 0.9, 0.9]),
        ("video2", &[0.5, 0.5, 0.6]),
        ("video3", &[0.1]),
        ("video4", &[0.5, 0.6, 0.5]),
    ]);
    let matcher = Matcher::new(&refs).unwrap();
    let query = Fingerprint::new("query", vec![0.5, 0.5]);

    let ranked = matcher.rank(&query).unwrap();
    let ids: Vec<&str> = ranked.iter().map(|r| r.matched_id.as_str()).collect();
    assert_eq!(ids, vec!["video2", "video4", "video1"]);

    assert_eq!(ranked[0].offset_seconds, 0);
    assert_eq!(ranked[0].cost, 0.0);
    // video4: offset 0 and 1 both cost 0.1, smaller offset kept
    assert_eq!(ranked[1].offset_seconds, 0);
    assert_relative_eq!(ranked[1].cost, 0.1);
    assert_relative_eq!(ranked[2].cost, 0.8);

    assert_eq!(matcher.find_best(&query).unwrap().as_ref(), ranked.first());
}

#[test]
fn test_best_alignment_direct() {
    assert_eq!(best_alignment(&[1, 2], &[1]), None);
    assert_eq!(best_alignment(&[], &[1, 2]), None);

    let a = best_alignment(&[5, 5], &[0, 5, 4, 5, 5]).unwrap();
    assert_eq!(a.offset, 3);
    assert_eq!(a.cost_tenths, 0);

    let a = best_alignment(&[3], &[0, 6, 0]).unwrap();
    assert_eq!(a.offset, 0);
    assert_eq!(a.cost_tenths, 3);
}

#[test]
fn test_off_grid_reference_is_rejected() {
    // 0.24 vs 0.2 against a 0.16 query would rank wrongly if rounded
    let refs = collection(&[("video1", &[0.24]), ("video2", &[0.2])]);
    assert!(matches!(Matcher::new(&refs), Err(Error::InvalidInput(_))));

    for bad in [-0.1, f64::NAN, f64::INFINITY] {
        let refs = collection(&[("video1", &[0.1, bad])]);
        assert!(matches!(Matcher::new(&refs), Err(Error::InvalidInput(_))), "{}", bad);
    }
}

#[test]
fn test_off_grid_query_is_rejected() {
    let refs = collection(&[("video1", &[0.25, 0.2])]);
    assert!(Matcher::new(&refs).is_err());

    let refs = collection(&[("video1", &[0.3, 0.2])]);
    let matcher = Matcher::new(&refs).unwrap();
    for query in [vec![0.25], vec![0.16], vec![-0.2], vec![f64::NAN]] {
        let query = Fingerprint::new("query", query);
        assert!(matches!(matcher.find_best(&query), Err(Error::InvalidInput(_))));
        assert!(matches!(matcher.rank(&query), Err(Error::InvalidInput(_))));
    }
}

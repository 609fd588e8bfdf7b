// tests/properties.rs
//
// Property checks for the pure scoring and derivation functions.

use opinion_clusters::keywords::frequency_score;
use opinion_clusters::presentation::{fill_color, radius, stroke_color, MAX_RADIUS, MIN_RADIUS};
use opinion_clusters::sentiment::SentimentScorer;
use opinion_clusters::similarity::similarity;
use opinion_clusters::{AssignmentEngine, ClusterSeed};
use opinion_clusters::cluster::ClusterState;
use proptest::prelude::*;

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z]{1,8}", 0..8).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn similarity_is_symmetric(a in words(), b in words()) {
        prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
    }

    #[test]
    fn similarity_with_self_is_one(a in "[a-z]{1,8}( [a-z]{1,8}){0,6}") {
        prop_assert_eq!(similarity(&a, &a), 1.0);
    }

    #[test]
    fn similarity_in_unit_range(a in ".{0,40}", b in ".{0,40}") {
        let s = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn sentiment_in_range(text in ".{0,200}") {
        let s = SentimentScorer::new().score(&text);
        prop_assert!((-1.0..=1.0).contains(&s));
    }

    #[test]
    fn radius_is_clamped(score in any::<u64>()) {
        let r = radius(score);
        prop_assert!((MIN_RADIUS..=MAX_RADIUS).contains(&r));
    }

    #[test]
    fn colors_are_deterministic(s in -3.0f64..3.0) {
        prop_assert_eq!(fill_color(s), fill_color(s));
        prop_assert_eq!(stroke_color(s), stroke_color(s));
        prop_assert_eq!(fill_color(s), fill_color(s.clamp(-1.0, 1.0)));
        prop_assert_eq!(stroke_color(s), stroke_color(s.clamp(-1.0, 1.0)));
    }

    #[test]
    fn frequency_score_counts_mentions(corpus in prop::collection::vec(words(), 0..6)) {
        let fs = frequency_score(corpus.iter().map(String::as_str));
        prop_assert!(fs > corpus.len() as u64 * 2);
    }

    #[test]
    fn assignment_is_referentially_transparent(
        text in words(),
        headings in prop::collection::vec(words(), 1..5),
    ) {
        let states: Vec<ClusterState> = headings
            .iter()
            .enumerate()
            .map(|(i, h)| ClusterState::from_seed(
                ClusterSeed::new(i as u64).heading(h.clone()),
                &SentimentScorer::new(),
            ))
            .collect();
        let roster: Vec<_> = states.iter().map(ClusterState::snapshot).collect();
        let engine = AssignmentEngine::default();
        let first = engine.assign(&text, &roster);
        prop_assert!(first.is_some());
        prop_assert_eq!(first, engine.assign(&text, &roster));
    }

    #[test]
    fn sentiment_recompute_is_idempotent(texts in prop::collection::vec(".{0,30}", 0..6)) {
        let scorer = SentimentScorer::new();
        let mut seed = ClusterSeed::new(1);
        for t in &texts {
            seed = seed.opinion(t.clone());
        }
        let mut c = ClusterState::from_seed(seed, &scorer);
        let before = c.sentiment_avg();
        c.recompute(&scorer);
        prop_assert_eq!(before, c.sentiment_avg());
        prop_assert!((-1.0..=1.0).contains(&before));
    }
}

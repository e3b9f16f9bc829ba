// Unit tests for Huddle Algo

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use huddle_algo::core::{
    distance::{calculate_bounding_box, haversine_km, is_within_bounding_box},
    eligibility::{dedupe_by_id, is_joinable, retain_joinable},
    ranking::{page_window, paginate, rank},
    scoring::history::{categorical_score, distance_score, pair_score, time_score},
    EventScorer, HistoryScorer, ProfileScorer,
};
use huddle_algo::models::{Event, Location, PageRequest, ScoredEvent, SkillLevel, UserProfile};
use std::collections::{BTreeSet, HashSet};

/// A public soccer event at the given position, 18:00-19:30 with no
/// participants, skill requirements or cutoff
fn sample_event(id: &str, longitude: f64, latitude: f64) -> Event {
    Event {
        id: id.to_string(),
        sport_type: "Soccer".to_string(),
        location: Location::new(longitude, latitude),
        date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        duration: "1.5".to_string(),
        max_participants: 10,
        participants: HashSet::new(),
        required_skill_level: BTreeSet::new(),
        created_by: "organizer".to_string(),
        is_private: false,
        whitelisted_users: HashSet::new(),
        cut_off_time: None,
    }
}

fn profile(prefs: &[(&str, &str)]) -> UserProfile {
    UserProfile {
        user_id: "u1".to_string(),
        sports_of_preference: prefs
            .iter()
            .map(|(sport, skill)| (sport.to_string(), skill.to_string()))
            .collect(),
    }
}

fn scored(scores: &[f64]) -> Vec<ScoredEvent> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| ScoredEvent {
            event: sample_event(&format!("e{}", i), 13.4, 52.5),
            score,
        })
        .collect()
}

#[test]
fn test_haversine_zero() {
    let berlin = Location::new(13.4050, 52.5200);
    assert!(haversine_km(berlin, berlin) < 0.001);
}

#[test]
fn test_haversine_berlin_to_munich() {
    // Roughly 504 km
    let berlin = Location::new(13.4050, 52.5200);
    let munich = Location::new(11.5820, 48.1351);
    let distance = haversine_km(berlin, munich);
    assert!(distance > 495.0 && distance < 515.0, "got {}", distance);
}

#[test]
fn test_haversine_is_symmetric() {
    let a = Location::new(-74.0060, 40.7128);
    let b = Location::new(-73.9442, 40.6782);
    assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
}

#[test]
fn test_bounding_box_contains_radius() {
    let center = Location::new(13.4050, 52.5200);
    let bbox = calculate_bounding_box(center, 10.0);

    // Roughly 0.18 degrees of latitude (10km / 111km per degree)
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);

    assert!(is_within_bounding_box(center, &bbox));
    assert!(is_within_bounding_box(Location::new(13.45, 52.55), &bbox));
    assert!(!is_within_bounding_box(Location::new(11.58, 48.13), &bbox));
}

#[test]
fn test_bounding_box_near_pole_spans_all_longitudes() {
    let bbox = calculate_bounding_box(Location::new(0.0, 89.95), 50.0);
    assert_eq!(bbox.min_lon, -180.0);
    assert_eq!(bbox.max_lon, 180.0);
    assert!(bbox.max_lat <= 90.0);
}

#[test]
fn test_bounding_box_keeps_events_across_the_pole() {
    // Just over the North Pole from the origin, well inside the radius
    let origin = Location::new(0.0, 89.5);
    let across = Location::new(180.0, 89.9);
    assert!(haversine_km(origin, across) < 100.0);

    let bbox = calculate_bounding_box(origin, 100.0);
    assert!(is_within_bounding_box(across, &bbox));
}

#[test]
fn test_bounding_box_keeps_high_latitude_events_at_large_radius() {
    let origin = Location::new(0.0, 70.0);
    let event = Location::new(60.0, 80.0);
    assert!(haversine_km(origin, event) < 2000.0);

    let bbox = calculate_bounding_box(origin, 2000.0);
    assert!(is_within_bounding_box(event, &bbox));
    assert!(bbox.max_lon < 180.0);
}

#[test]
fn test_history_scorer_excludes_candidate_itself() {
    let past = sample_event("e1", 13.4, 52.5);
    let scorer = HistoryScorer::new(vec![past.clone()]);

    // Only comparable past event is the candidate itself
    assert_eq!(scorer.score(&past), 0.0);
}

#[test]
fn test_history_scorer_averages_over_history() {
    let a = sample_event("a", 13.4, 52.5);
    let b = sample_event("b", 13.5, 52.5);
    let candidate = sample_event("c", 13.45, 52.5);

    let scorer = HistoryScorer::new(vec![a.clone(), b.clone()]);
    let expected = (pair_score(&a, &candidate) + pair_score(&b, &candidate)) / 2.0;
    assert!((scorer.score(&candidate) - expected).abs() < 1e-12);
}

#[test]
fn test_pair_score_for_identical_twin() {
    // Same place, time and sport; no participants or skills to overlap
    let past = sample_event("past", 13.4, 52.5);
    let candidate = sample_event("candidate", 13.4, 52.5);

    assert!(distance_score(&past, &candidate) < 1e-9);
    assert!((time_score(&past, &candidate) - 1.0).abs() < 1e-12);
    assert!((categorical_score(&past, &candidate) - 1.0 / 3.0).abs() < 1e-12);
    assert!((pair_score(&past, &candidate) - (0.4 / 3.0 + 0.2)).abs() < 1e-9);
}

#[test]
fn test_distance_score_is_not_clamped() {
    let berlin = sample_event("berlin", 13.4050, 52.5200);
    let munich = sample_event("munich", 11.5820, 48.1351);
    assert!(distance_score(&berlin, &munich) > 4.0);
}

#[test]
fn test_profile_scorer_points() {
    let scorer = ProfileScorer::new(&profile(&[("soccer", "INTERMEDIATE")]));

    let mut matching = sample_event("e1", 13.4, 52.5);
    matching.required_skill_level.insert(SkillLevel::Intermediate);
    assert_eq!(scorer.score(&matching), 1.0);

    let sport_only = sample_event("e2", 13.4, 52.5);
    assert_eq!(scorer.score(&sport_only), 0.5);

    let mut other = sample_event("e3", 13.4, 52.5);
    other.sport_type = "Tennis".to_string();
    assert_eq!(scorer.score(&other), 0.0);
}

#[test]
fn test_profile_scorer_without_preferences_scores_zero() {
    let scorer = ProfileScorer::new(&UserProfile::empty("u1"));
    assert_eq!(scorer.score(&sample_event("e1", 13.4, 52.5)), 0.0);
}

#[test]
fn test_expired_cutoff_is_not_joinable() {
    let now = Utc::now();
    let mut event = sample_event("e1", 13.4, 52.5);

    event.cut_off_time = Some(now - Duration::minutes(1));
    assert!(!is_joinable(&event, "u1", now));

    event.cut_off_time = Some(now + Duration::hours(1));
    assert!(is_joinable(&event, "u1", now));
}

#[test]
fn test_private_event_requires_whitelist() {
    let now = Utc::now();
    let mut event = sample_event("e1", 13.4, 52.5);
    event.is_private = true;
    assert!(!is_joinable(&event, "u1", now));

    event.whitelisted_users.insert("u1".to_string());
    assert!(is_joinable(&event, "u1", now));
    assert!(!is_joinable(&event, "u2", now));
}

#[test]
fn test_retain_joinable_and_dedupe() {
    let now = Utc::now();
    let mut private = sample_event("private", 13.4, 52.5);
    private.is_private = true;

    let events = vec![
        sample_event("a", 13.4, 52.5),
        private,
        sample_event("a", 13.5, 52.5),
        sample_event("b", 13.4, 52.5),
    ];

    let kept = dedupe_by_id(retain_joinable(events, "u1", now));
    let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    // First occurrence wins
    assert_eq!(kept[0].location.longitude, 13.4);
}

#[test]
fn test_rank_is_descending() {
    let ranked = rank(scored(&[0.2, 0.9, 0.5, 0.9, 0.0]));
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_pagination_boundaries() {
    assert_eq!(page_window(5, PageRequest::new(0, 2)), 0..2);
    assert_eq!(page_window(5, PageRequest::new(2, 2)), 4..5);
    assert_eq!(page_window(5, PageRequest::new(3, 2)), 5..5);

    let page = paginate(rank(scored(&[0.1, 0.2, 0.3])), PageRequest::new(7, 10));
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 3);
}

#[test]
fn test_pagination_covers_ranked_list() {
    let ranked = rank(scored(&[0.3, 0.7, 0.1, 0.9, 0.5, 0.2, 0.8]));
    let expected: Vec<String> = ranked.iter().map(|s| s.event.id.clone()).collect();

    let mut walked = Vec::new();
    for page in 0..3 {
        let result = paginate(ranked.clone(), PageRequest::new(page, 3));
        assert_eq!(result.total_count, 7);
        walked.extend(result.items.into_iter().map(|item| item.id));
    }

    assert_eq!(walked, expected);
}

//! Integration tests for the skill rating engine
//!
//! These tests drive the engine the way a match-resolution service would:
//! - Rating both sides of a match per category
//! - Idle periods feeding Glicko-2 inflation
//! - Migrating legacy ELO records onto Glicko-2
//! - Error reporting for bad input and bad configuration

mod fixtures;

use chrono::{Duration, TimeZone, Utc};
use skill_rating_engine::config::{EngineConfig, Glicko2Settings};
use skill_rating_engine::rating::{
    rating_periods_elapsed, AdaptiveEloModel, Glicko2Model, RatingConverter, RatingState,
};
use skill_rating_engine::types::{EloRating, Glicko2Rating, MatchObservation, Outcome};
use skill_rating_engine::RatingError;
use std::sync::Arc;
use std::thread;

use fixtures::{
    elo, glicko, mixed_engine, reference_engine, unwrap_elo, unwrap_glicko, ELO_CATEGORY,
    GLICKO_CATEGORY,
};

#[test]
fn test_scenario_new_player_wins_even_match() {
    let model = AdaptiveEloModel::default();
    assert_eq!(model.update(1000.0, 1000.0, true, 0).unwrap(), 1024.0);
}

#[test]
fn test_scenario_veteran_loses_even_match() {
    let model = AdaptiveEloModel::default();
    assert_eq!(model.update(2100.0, 2100.0, false, 50).unwrap(), 2088.0);
}

#[test]
fn test_scenario_fresh_glicko_loss() {
    let model = Glicko2Model::default();
    let fresh = Glicko2Rating::new(1500.0, 350.0, 0.06);

    let updated = model
        .update(&fresh, &[MatchObservation::new(fresh, Outcome::Loss)], 0.0)
        .unwrap();

    assert!(updated.rating < 1500.0);
    assert!(updated.deviation < 350.0);
}

#[test]
fn test_scenario_idle_glicko_player() {
    let model = Glicko2Model::default();
    let player = Glicko2Rating::new(1650.0, 50.0, 0.06);

    let idle = model.update(&player, &[], 5.0).unwrap();

    assert_eq!(idle.rating, 1650.0);
    assert!(idle.deviation > 50.0);
    assert!(idle.deviation <= 350.0);
}

#[test]
fn test_scenario_legacy_conversion() {
    let converter = RatingConverter::default();

    let fresh = converter.from_legacy_elo(1800.0, 0).unwrap();
    assert_eq!(fresh, Glicko2Rating::new(1800.0, 350.0, 0.06));

    let veteran = converter.from_legacy_elo(1800.0, 40).unwrap();
    assert_eq!(veteran.deviation, 50.0);
    assert_eq!(veteran.volatility, 0.03);
}

#[test]
fn test_elo_season_between_two_players() {
    let engine = mixed_engine();
    let mut alice = elo(1200.0, 0);
    let mut bob = elo(1200.0, 0);

    // Alice wins 8 of 10
    for game in 0..10 {
        let outcome = if game % 5 == 4 {
            Outcome::Loss
        } else {
            Outcome::Win
        };
        let resolution = engine
            .resolve_match(ELO_CATEGORY, &alice, &bob, outcome)
            .unwrap();
        alice.state = resolution.player.new;
        bob.state = resolution.opponent.new;
    }

    let alice_elo = unwrap_elo(&alice.state);
    let bob_elo = unwrap_elo(&bob.state);
    assert!(alice_elo.rating > bob_elo.rating);
    assert_eq!(alice_elo.match_count, 10);
    assert_eq!(bob_elo.match_count, 10);
    assert!(bob_elo.rating >= 0.0);
}

#[test]
fn test_glicko_match_with_idle_opponent() {
    let engine = mixed_engine();
    let regular = glicko(1600.0, 80.0, 0.06);
    let returning = glicko(1600.0, 80.0, 0.06).idle_for(20.0);

    let resolution = engine
        .resolve_match(GLICKO_CATEGORY, &regular, &returning, Outcome::Win)
        .unwrap();

    let winner = unwrap_glicko(&resolution.player.new);
    let loser = unwrap_glicko(&resolution.opponent.new);

    // The returning player's inflated uncertainty makes their loss cost more
    assert!(resolution.opponent.delta.abs() > resolution.player.delta.abs());
    assert!(winner.rating > 1600.0);
    assert!(loser.rating < 1600.0);
}

#[test]
fn test_periods_helper_feeds_decay() {
    let model = Glicko2Model::default();
    let player = Glicko2Rating::new(1500.0, 60.0, 0.06);
    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let after_week = rating_periods_elapsed(
        Some(last),
        last + Duration::days(7),
        Duration::days(1),
    )
    .unwrap();
    let after_month = rating_periods_elapsed(
        Some(last),
        last + Duration::days(30),
        Duration::days(1),
    )
    .unwrap();

    let week = model.decay(&player, after_week).unwrap();
    let month = model.decay(&player, after_month).unwrap();
    assert!(week.deviation < month.deviation);
    assert_eq!(week.rating, month.rating);
}

#[test]
fn test_migrated_records_play_in_glicko_category() {
    let engine = reference_engine();
    let legacy = EloRating::new(1850.0, 25);
    let migrated = engine.migrate_to_glicko2(&legacy).unwrap();
    let newcomer = engine.initial_state(GLICKO_CATEGORY);

    let resolution = engine
        .resolve_match(
            GLICKO_CATEGORY,
            &skill_rating_engine::rating::Participant::new(migrated),
            &skill_rating_engine::rating::Participant::new(newcomer),
            Outcome::Loss,
        )
        .unwrap();

    // The newcomer is far less certain, so they move further
    assert!(resolution.opponent.delta > resolution.player.delta.abs());
    assert_eq!(engine.display_rating(&migrated).unwrap(), 1850);
}

#[test]
fn test_confidence_interval_narrows_with_games() {
    let engine = mixed_engine();
    let converter = engine.converter();
    let mut player = engine.initial_state(GLICKO_CATEGORY);
    let opponent = engine.initial_state(GLICKO_CATEGORY);

    let first = converter
        .confidence_interval(&unwrap_glicko(&player))
        .unwrap();

    for _ in 0..5 {
        player = engine
            .system(GLICKO_CATEGORY)
            .rate(&player, &opponent, Outcome::Draw, 0.0)
            .unwrap();
    }

    let later = converter
        .confidence_interval(&unwrap_glicko(&player))
        .unwrap();
    assert!(later.upper - later.lower < first.upper - first.lower);
    assert!(later.lower <= later.rating && later.rating <= later.upper);
}

#[test]
fn test_invalid_inputs_are_reported_not_defaulted() {
    let engine = mixed_engine();

    let err = engine
        .resolve_match(
            ELO_CATEGORY,
            &elo(f64::NAN, 0),
            &elo(1500.0, 0),
            Outcome::Win,
        )
        .unwrap_err();
    assert!(matches!(err, RatingError::InvalidArgument { .. }));

    let err = engine
        .resolve_match(
            GLICKO_CATEGORY,
            &glicko(1500.0, 350.0, 0.06).idle_for(-2.0),
            &glicko(1500.0, 350.0, 0.06),
            Outcome::Win,
        )
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_non_convergence_propagates_through_engine() {
    let mut config = EngineConfig::default();
    config.glicko2 = Glicko2Settings {
        max_iterations: 1,
        ..Glicko2Settings::reference()
    };
    config.categories.default_system = skill_rating_engine::config::RatingSystemKind::Glicko2;
    let engine = skill_rating_engine::RatingEngine::new(config).unwrap();

    let result = engine.resolve_match(
        "any",
        &glicko(1500.0, 200.0, 0.06),
        &glicko(1700.0, 300.0, 0.06),
        Outcome::Loss,
    );

    match result {
        Err(RatingError::NumericalNonConvergence { .. }) => {}
        other => panic!("expected non-convergence, got {:?}", other),
    }
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = Arc::new(mixed_engine());
    let expected = engine
        .resolve_match(
            GLICKO_CATEGORY,
            &glicko(1520.0, 120.0, 0.06),
            &glicko(1480.0, 90.0, 0.05),
            Outcome::Win,
        )
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .resolve_match(
                        GLICKO_CATEGORY,
                        &glicko(1520.0, 120.0, 0.06),
                        &glicko(1480.0, 90.0, 0.05),
                        Outcome::Win,
                    )
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let resolution = handle.join().unwrap();
        assert_eq!(resolution, expected);
    }
}

#[test]
fn test_state_kind_matches_category() {
    let engine = mixed_engine();
    assert!(matches!(
        engine.initial_state(ELO_CATEGORY),
        RatingState::AdaptiveElo(_)
    ));
    assert!(matches!(
        engine.initial_state(GLICKO_CATEGORY),
        RatingState::Glicko2(_)
    ));
}

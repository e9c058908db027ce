use serde_json::json;

use super::{engine_at_phase_one, make_valid_selection, score_reply};
use crate::config::FlowConfig;
use crate::engine::{Leaderboard, QuestEngine};
use crate::types::LeaderboardEntry;
use crate::view::{CollectorView, GameView, LeaderboardView};

fn entry(rank: u32, username: &str, total_score: u32) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        username: username.into(),
        total_score,
        stars: 0,
        mot_scores: Default::default(),
    }
}

#[test]
fn test_entry_screen_view() {
    let engine = QuestEngine::new(FlowConfig::default());
    let view = GameView::from_engine(&engine);
    assert_eq!(view.screen, "bootstrapping");
    assert_eq!(view.progress, 0);
    assert!(view.phase.is_none());
    assert!(view.collector.is_none());
    assert!(!view.can_confirm);
    assert_eq!(view.max_total, 15);
}

#[test]
fn test_phase_view_tracks_selection_and_busy_state() {
    let (mut engine, _backend) = engine_at_phase_one(FlowConfig::default());
    engine.select("james").unwrap();

    let view = GameView::from_engine(&engine);
    assert_eq!(view.screen, "phase");
    assert_eq!(
        view.phase_title.as_deref(),
        Some("Embedding GenAI in your AI transformation program")
    );
    assert!(view.can_confirm);
    let Some(CollectorView::Single { options }) = &view.collector else {
        panic!("phase 1 renders a single-select collector");
    };
    let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.id.as_str()).collect();
    assert_eq!(selected, ["james"]);

    engine.confirm().unwrap();
    let view = GameView::from_engine(&engine);
    assert!(view.busy);
    assert!(!view.can_confirm);
    assert!(!view.loading_choices);
}

#[test]
fn test_score_view_after_confirm() {
    let (mut engine, mut backend) = engine_at_phase_one(FlowConfig::default());
    backend.reply("/api/phase1/choose", score_reply(&[("mot1", 2)]));
    make_valid_selection(&mut engine);
    let call = engine.confirm().unwrap();
    backend.drive(&mut engine, call).unwrap();

    let view = GameView::from_engine(&engine);
    assert_eq!(view.screen, "scored");
    assert_eq!(view.progress, 40);
    assert_eq!(view.total, 2);
    assert_eq!(view.phase_scores.get("mot1"), Some(&2));
    assert!(view.collector.is_none());
    assert_eq!(view.reveal.unwrap().phase_score, 2);
}

#[test]
fn test_budget_view_disables_unaffordable_options() {
    let mut engine = QuestEngine::new(FlowConfig::default());
    let mut backend = super::ScriptedBackend::standard();
    backend.reply(
        "/api/game_state",
        json!({
            "success": true,
            "current_path": {
                "mot1_choice": "elena",
                "mot2_choices": ["s1", "s2", "s3"],
                "mot3_choices": { "people_processes": "pp1" }
            }
        }),
    );
    backend.reply("/api/current_score", super::score_reply(&[("mot1", 3)]));
    let call = engine.resume().unwrap();
    backend.drive(&mut engine, call).unwrap();

    engine.toggle_enabler("e1").unwrap();
    engine.toggle_enabler("e2").unwrap();
    let view = GameView::from_engine(&engine);
    let Some(CollectorView::Budget {
        options,
        spent,
        remaining,
        ..
    }) = &view.collector
    else {
        panic!("phase 4 renders the budget collector");
    };
    assert_eq!((*spent, *remaining), (22, 8));
    let disabled: Vec<_> = options.iter().filter(|o| o.disabled).map(|o| o.id.as_str()).collect();
    assert_eq!(disabled, ["e4"], "e2 is selected, e3 costs exactly the rest");
}

#[test]
fn test_leaderboard_stats_and_highlight() {
    let board = Leaderboard {
        entries: vec![entry(1, "ada", 15), entry(2, "bob", 10), entry(3, "cy", 8)],
        user_rank: None,
        current_username: Some("bob".into()),
        ..Leaderboard::default()
    };
    let view = LeaderboardView::from_leaderboard(&board, None);
    assert_eq!(view.player_count, 3);
    assert_eq!(view.average_score, 11);
    assert_eq!(view.top_score, 15);
    assert_eq!(view.user_rank, Some(2));
    assert!(view.rows[1].is_current_user);
    assert!(!view.rows[0].is_current_user);

    let empty = LeaderboardView::from_leaderboard(&Leaderboard::default(), Some("ada"));
    assert_eq!((empty.player_count, empty.average_score, empty.top_score), (0, 0, 0));
    assert_eq!(empty.user_rank, None);
}

#[test]
fn test_view_serializes_for_the_page() {
    let (engine, _backend) = engine_at_phase_one(FlowConfig::default());
    let value = serde_json::to_value(GameView::from_engine(&engine)).unwrap();
    assert_eq!(value["screen"], "phase");
    assert_eq!(value["phase"], 1);
    assert_eq!(value["collector"]["kind"], "single");
    assert_eq!(value["maxTotal"], 15);
}

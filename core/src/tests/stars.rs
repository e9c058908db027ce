use crate::feedback::{performance_message, phase_title, score_message};
use crate::stars::{calculate_new_score, star_string, StarBucketing};
use crate::state::FlowState;
use crate::types::Phase;

#[test]
fn test_canonical_bucketing() {
    assert_eq!(calculate_new_score(15), 3);
    assert_eq!(calculate_new_score(14), 3);
    assert_eq!(calculate_new_score(13), 2);
    assert_eq!(calculate_new_score(10), 2);
    assert_eq!(calculate_new_score(9), 1);
    assert_eq!(calculate_new_score(0), 1);
}

#[test]
fn test_strict_bucketing_differs_only_at_ten() {
    for total in 0..=15u8 {
        let standard = StarBucketing::Standard.stars(total);
        let strict = StarBucketing::Strict.stars(total);
        if total == 10 {
            assert_eq!((standard, strict), (2, 1));
        } else {
            assert_eq!(standard, strict, "total {}", total);
        }
    }
}

#[test]
fn test_star_string() {
    assert_eq!(star_string(0), "☆☆☆");
    assert_eq!(star_string(2), "★★☆");
    assert_eq!(star_string(7), "★★★");
}

#[test]
fn test_phase_one_messages_follow_chosen_character() {
    assert!(score_message(Phase::One, 2, Some("james")).starts_with("Good Choice! By selecting James"));
    assert!(score_message(Phase::One, 1, Some("amira")).starts_with("Interesting Choice!"));
    // Character text only matches its own score
    assert_eq!(
        score_message(Phase::One, 2, Some("elena")),
        "Good choice! You're on the right track."
    );
}

#[test]
fn test_generic_messages_by_phase_and_score() {
    assert_eq!(
        score_message(Phase::Two, 3, None),
        "Perfect! You selected the ideal foundation solutions."
    );
    assert_eq!(
        score_message(Phase::Four, 0, None),
        "Your sustainability strategy needs work."
    );
    assert_eq!(
        score_message(Phase::Three, 9, None),
        "You earned 9 stars out of 3 for Step 3."
    );
}

#[test]
fn test_titles_and_performance_messages() {
    assert_eq!(phase_title(Phase::Two), "Building the right foundation");
    assert_eq!(phase_title(Phase::Five), "Accelerating the transformation");
    assert!(performance_message(3).starts_with("Excellent work!"));
    assert!(performance_message(2).starts_with("Good work!"));
    assert!(performance_message(1).starts_with("Keep learning!"));
}

#[test]
fn test_progress_by_screen() {
    assert_eq!(FlowState::Intro.progress(), 10);
    assert_eq!(FlowState::Phase(Phase::One).progress(), 20);
    assert_eq!(FlowState::Scored(Phase::One).progress(), 40);
    assert_eq!(FlowState::Dashboard(Phase::Two).progress(), 60);
    assert_eq!(FlowState::Phase(Phase::Four).progress(), 80);
    assert_eq!(FlowState::Scored(Phase::Four).progress(), 90);
    assert_eq!(FlowState::FinalResults.progress(), 100);
}

//! Flavor text shown on the score screens

use crate::types::Phase;

pub fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::One => "Embedding GenAI in your AI transformation program",
        Phase::Two => "Building the right foundation",
        Phase::Three => "Scaling across the organization",
        Phase::Four => "Ensuring sustainable success",
        Phase::Five => "Accelerating the transformation",
    }
}

/// Message for a phase score. Phase 1 has texts tied to the chosen character.
pub fn score_message(phase: Phase, score: u8, choice: Option<&str>) -> String {
    if phase == Phase::One {
        if let Some(text) = choice.and_then(|id| character_message(id, score)) {
            return text.to_string();
        }
    }
    if let Some(text) = generic_message(phase, score) {
        return text.to_string();
    }
    let plural = if score == 1 { "" } else { "s" };
    format!(
        "You earned {} star{} out of 3 for Step {}.",
        score, plural, phase
    )
}

fn character_message(choice: &str, score: u8) -> Option<&'static str> {
    match (choice.to_ascii_lowercase().as_str(), score) {
        ("elena", 3) => Some(
            "Excellent! By choosing Elena's approach, you earned 3 stars out of 3. \
             This value-driven and culture-aligned strategy ensures you'll build a \
             sustainable AI roadmap.",
        ),
        ("james", 2) => Some(
            "Good Choice! By selecting James's approach, you earned 2 stars out of 3. \
             You chose a prudent and structured path, focusing on data, technology, \
             and architecture.",
        ),
        ("amira", 1) => Some(
            "Interesting Choice! By selecting Amira's approach, you earned 1 star out \
             of 3. This fast-paced, experimentation-focused strategy can deliver quick \
             wins.",
        ),
        _ => None,
    }
}

fn generic_message(phase: Phase, score: u8) -> Option<&'static str> {
    // Out-of-range scores fall through to the "You earned" sentence
    if score > 3 {
        return None;
    }
    let [best, good, weak] = match phase {
        Phase::One => [
            "Excellent! You chose the optimal approach for embedding GenAI.",
            "Good choice! You're on the right track.",
            "Consider reviewing your approach for better results.",
        ],
        Phase::Two => [
            "Perfect! You selected the ideal foundation solutions.",
            "Good foundation! You made solid choices.",
            "Your foundation could be stronger.",
        ],
        Phase::Three => [
            "Outstanding! You've mastered organizational scaling.",
            "Well done! Good scaling strategy.",
            "Consider improving your scaling approach.",
        ],
        Phase::Four => [
            "Excellent! You've ensured sustainable success.",
            "Good sustainability planning!",
            "Your sustainability strategy needs work.",
        ],
        Phase::Five => [
            "Perfect! You've accelerated the transformation.",
            "Good acceleration strategy!",
            "Consider optimizing your acceleration approach.",
        ],
    };
    Some(match score {
        3 => best,
        2 => good,
        _ => weak,
    })
}

/// Closing message for the final star rating
pub fn performance_message(stars: u8) -> &'static str {
    match stars {
        3 => "Excellent work! You mastered every aspect of the GenAI transformation.",
        2 => "Good work! You have a solid understanding of the GenAI transformation.",
        _ => "Keep learning! There are still opportunities for improvement.",
    }
}

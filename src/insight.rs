use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::Mood;

/// Returned for any raw mood value that is not one of the known variants
pub const FALLBACK_INSIGHT: &str = "Every emotion is valid. Take care of yourself today.";

/// Journaling prompts offered once a mood has been picked
pub const GUIDED_PROMPTS: [&str; 5] = [
    "What made you feel this way today?",
    "What are three things you're grateful for right now?",
    "How did your body feel when you experienced this mood?",
    "What would you tell a friend feeling the same way?",
    "What's one small thing that could improve your mood?",
];

/// The personalised insight attached to a new entry
pub fn compute_insight(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => {
            "You're radiating positive energy today! Consider sharing this joy with someone you care about."
        }
        Mood::Excited => {
            "Your excitement is contagious! Channel this energy into something creative or meaningful."
        }
        Mood::Energetic => {
            "Great energy today! This might be the perfect time to tackle that task you've been putting off."
        }
        Mood::Calm => {
            "Your inner peace is showing. Take a moment to appreciate this tranquil state of mind."
        }
        Mood::Neutral => {
            "Neutral days are perfectly normal. Sometimes it's okay to just be present and observe."
        }
        Mood::Tired => {
            "Your body and mind need rest. Consider some gentle self-care or an early bedtime tonight."
        }
        Mood::Anxious => {
            "Feeling anxious? Try the 4-7-8 breathing technique: inhale for 4, hold for 7, exhale for 8."
        }
        Mood::Stressed => {
            "Stress is your body's signal to slow down. Take 5 minutes for deep breathing or a short walk."
        }
        Mood::Sad => {
            "It's okay to feel sad. Allow yourself to process these emotions - they're valid and temporary."
        }
    }
}

/// Insight lookup for a raw mood string, e.g. one read back from storage
pub fn insight_for(raw_mood: &str) -> &'static str {
    raw_mood
        .parse::<Mood>()
        .map(compute_insight)
        .unwrap_or(FALLBACK_INSIGHT)
}

/// Pick one of the guided prompts at random
pub fn guided_prompt<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    GUIDED_PROMPTS.choose(rng).copied().unwrap_or(GUIDED_PROMPTS[0])
}

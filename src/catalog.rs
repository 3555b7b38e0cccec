//! Built-in stage roster for the compatibility game

use crate::engine::GameError;
use crate::types::{Question, Stage, StageId};

fn stage(id: &str, name: &str, questions: Vec<Question>) -> Stage {
    Stage {
        id: id.to_string(),
        name: name.to_string(),
        questions,
    }
}

/// The default stages, in play order
pub fn default_stages() -> Vec<Stage> {
    vec![
        stage(
            "first_date",
            "First Date",
            vec![
                Question::new(
                    "What's your ideal first date?",
                    [
                        "Coffee & Chat",
                        "Adventure Activity",
                        "Dinner & Movie",
                        "Walk in the Park",
                    ],
                ),
                Question::new(
                    "Who should pick the place?",
                    [
                        "Me, I have a list",
                        "You, surprise me",
                        "We flip a coin",
                        "Wherever has food",
                    ],
                ),
            ],
        ),
        stage(
            "future",
            "Future Plans",
            vec![
                Question::new(
                    "Where do you see yourself in 5 years?",
                    [
                        "Traveling World",
                        "Career Focused",
                        "Starting Family",
                        "Personal Growth",
                    ],
                ),
                Question::new(
                    "Your dream place to live?",
                    ["Big City", "Beach Town", "Countryside", "Anywhere with Wi-Fi"],
                ),
            ],
        ),
        stage(
            "love_language",
            "Love Language",
            vec![
                Question::new(
                    "What's your love language?",
                    [
                        "Quality Time",
                        "Physical Touch",
                        "Acts of Service",
                        "Words of Affirmation",
                    ],
                ),
                Question::new(
                    "The best way to make up after a fight?",
                    ["Talk it out", "Give it a day", "A long hug", "Cook together"],
                ),
                Question::new(
                    "Perfect lazy Sunday?",
                    ["Brunch Date", "Movie Marathon", "Long Hike", "Sleeping In"],
                ),
            ],
        ),
    ]
}

/// Pick stages from `catalog` by id, preserving the requested order
pub fn select(catalog: &[Stage], ids: &[StageId]) -> Result<Vec<Stage>, GameError> {
    ids.iter()
        .map(|id| {
            catalog
                .iter()
                .find(|s| &s.id == id)
                .cloned()
                .ok_or_else(|| GameError::InvalidConfiguration(format!("Unknown stage '{}'", id)))
        })
        .collect()
}

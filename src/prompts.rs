//! Prompt Template Registry
//!
//! Four fixed templates, one per goal category. A free-text fitness goal is
//! mapped to a category by case-insensitive keyword matching, checked in a
//! fixed priority order:
//! - strength / muscle
//! - endurance / cardio
//! - fat / weight loss / lose
//! - anything else falls through to the general template
//!
//! Template bodies use `{slot}` placeholders filled at render time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coaching persona and instructions shared by every template
pub const SYSTEM_PROMPT: &str = include_str!("prompts/coach_system.txt");

// ---------------------------------------------------------------------------
/// Goal Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    General,
    Strength,
    Endurance,
    FatLoss,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Strength => "strength",
            Self::Endurance => "endurance",
            Self::FatLoss => "fat_loss",
        }
    }
}

impl std::fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
/// Goal Selection
// ---------------------------------------------------------------------------

/// Evaluated top to bottom, first match wins
const GOAL_RULES: &[(&[&str], GoalCategory)] = &[
    (&["strength", "muscle"], GoalCategory::Strength),
    (&["endurance", "cardio"], GoalCategory::Endurance),
    (&["fat", "weight loss", "lose"], GoalCategory::FatLoss),
];

/// Map a fitness goal to its category. Total: unmatched goals are `General`.
pub fn categorize(fitness_goal: &str) -> GoalCategory {
    let goal = fitness_goal.to_lowercase();

    GOAL_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| goal.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(GoalCategory::General)
}

/// Pick the template for a fitness goal
pub fn select(fitness_goal: &str) -> &'static PromptTemplate {
    template(categorize(fitness_goal))
}

pub fn template(category: GoalCategory) -> &'static PromptTemplate {
    match category {
        GoalCategory::General => &GENERAL_TEMPLATE,
        GoalCategory::Strength => &STRENGTH_TEMPLATE,
        GoalCategory::Endurance => &ENDURANCE_TEMPLATE,
        GoalCategory::FatLoss => &FAT_LOSS_TEMPLATE,
    }
}

static GENERAL_TEMPLATE: PromptTemplate =
    PromptTemplate::new(GoalCategory::General, include_str!("prompts/general.txt"));
static STRENGTH_TEMPLATE: PromptTemplate =
    PromptTemplate::new(GoalCategory::Strength, include_str!("prompts/strength.txt"));
static ENDURANCE_TEMPLATE: PromptTemplate =
    PromptTemplate::new(GoalCategory::Endurance, include_str!("prompts/endurance.txt"));
static FAT_LOSS_TEMPLATE: PromptTemplate =
    PromptTemplate::new(GoalCategory::FatLoss, include_str!("prompts/fat_loss.txt"));

// ---------------------------------------------------------------------------
/// Templates and Rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("{category} template has an unclosed placeholder at byte {offset}")]
    Unclosed { category: GoalCategory, offset: usize },

    #[error("{category} template references unknown slot '{slot}'")]
    UnknownSlot { category: GoalCategory, slot: String },
}

/// Values for the named slots a template may reference
#[derive(Debug, Clone, Copy)]
pub struct PromptVars<'a> {
    pub system_prompt: &'a str,
    pub workout_history: &'a str,
    pub fitness_goal: &'a str,
    pub current_date: &'a str,
}

impl<'a> PromptVars<'a> {
    fn get(&self, slot: &str) -> Option<&'a str> {
        match slot {
            "system_prompt" => Some(self.system_prompt),
            "workout_history" => Some(self.workout_history),
            "fitness_goal" => Some(self.fitness_goal),
            "current_date" => Some(self.current_date),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    pub category: GoalCategory,
    body: &'static str,
}

impl PromptTemplate {
    pub const fn new(category: GoalCategory, body: &'static str) -> Self {
        Self { category, body }
    }

    /// Slot names in order of appearance
    pub fn slots(&self) -> Vec<&'static str> {
        let mut slots = Vec::new();
        let mut rest = self.body;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else { break };
            slots.push(&after[..close]);
            rest = &after[close + 1..];
        }
        slots
    }

    /// Fill every placeholder. Substituted values are not re-scanned, so braces
    /// inside the history or goal text pass through untouched.
    pub fn render(&self, vars: &PromptVars<'_>) -> Result<String, PromptError> {
        let mut out = String::with_capacity(
            self.body.len() + vars.system_prompt.len() + vars.workout_history.len(),
        );
        let mut rest = self.body;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);

            let after = &rest[open + 1..];
            let close = after.find('}').ok_or(PromptError::Unclosed {
                category: self.category,
                offset: self.body.len() - rest.len() + open,
            })?;

            let slot = &after[..close];
            let value = vars.get(slot).ok_or_else(|| PromptError::UnknownSlot {
                category: self.category,
                slot: slot.to_string(),
            })?;
            out.push_str(value);

            rest = &after[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

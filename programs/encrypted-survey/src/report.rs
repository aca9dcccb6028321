//! Personality report and tally views.
//!
//! Pure functions over already decrypted values. Nothing here touches a
//! handle or the backend.

use anchor_lang::prelude::*;

use crate::catalog::QUESTIONS;
use crate::constants::{MAX_OPTIONS, QUESTION_COUNT};
use crate::error::SurveyError;

/// Upper bound on tips in one report.
pub const MAX_TIPS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Approach {
    Planner,
    Adapter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discussion {
    Direct,
    Thoughtful,
    Selective,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decisions {
    Analytical,
    ValuesLed,
    Intuitive,
    ConsensusDriven,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recharge {
    Solo,
    Social,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pressure {
    Calm,
    Energized,
    Structured,
}

// Choices past the listed options fall through to the last variant.

impl Approach {
    pub fn from_choice(choice: u8) -> Self {
        match choice {
            0 => Self::Planner,
            _ => Self::Adapter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Planner => "Planner",
            Self::Adapter => "Adapter",
        }
    }
}

impl Discussion {
    pub fn from_choice(choice: u8) -> Self {
        match choice {
            0 => Self::Direct,
            1 => Self::Thoughtful,
            _ => Self::Selective,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Thoughtful => "Thoughtful",
            Self::Selective => "Selective",
        }
    }
}

impl Decisions {
    pub fn from_choice(choice: u8) -> Self {
        match choice {
            0 => Self::Analytical,
            1 => Self::ValuesLed,
            2 => Self::Intuitive,
            _ => Self::ConsensusDriven,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Analytical => "Analytical",
            Self::ValuesLed => "Values-led",
            Self::Intuitive => "Intuitive",
            Self::ConsensusDriven => "Consensus-driven",
        }
    }
}

impl Recharge {
    pub fn from_choice(choice: u8) -> Self {
        match choice {
            0 => Self::Solo,
            _ => Self::Social,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Solo => "Solo-recharge",
            Self::Social => "Social-recharge",
        }
    }
}

impl Pressure {
    pub fn from_choice(choice: u8) -> Self {
        match choice {
            0 => Self::Calm,
            1 => Self::Energized,
            _ => Self::Structured,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Calm => "Calm",
            Self::Energized => "Energized",
            Self::Structured => "Structured",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportTrait {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub title: &'static str,
    pub summary: String,
    pub traits: Vec<ReportTrait>,
    pub tips: Vec<&'static str>,
}

pub fn build_report(choices: &[u8; QUESTION_COUNT]) -> Report {
    let approach = Approach::from_choice(choices[0]);
    let discussion = Discussion::from_choice(choices[1]);
    let decisions = Decisions::from_choice(choices[2]);
    let recharge = Recharge::from_choice(choices[3]);
    let pressure = Pressure::from_choice(choices[4]);

    let title = match (approach, recharge) {
        (Approach::Planner, Recharge::Solo) => "The Strategic Builder",
        (Approach::Planner, Recharge::Social) => "The Coordinated Leader",
        (Approach::Adapter, Recharge::Solo) => "The Independent Explorer",
        (Approach::Adapter, Recharge::Social) => "The Dynamic Connector",
    };

    let summary = format!(
        "You show a {} approach with a {} communication style. Your decisions are mainly {}, \
         you tend to {}, and under pressure you are typically {}.",
        approach.label().to_lowercase(),
        discussion.label().to_lowercase(),
        decisions.label().to_lowercase(),
        recharge.label().to_lowercase().replacen('-', " ", 1),
        pressure.label().to_lowercase(),
    );

    let traits = vec![
        ReportTrait { label: "Approach", value: approach.label() },
        ReportTrait { label: "Discussion", value: discussion.label() },
        ReportTrait { label: "Decisions", value: decisions.label() },
        ReportTrait { label: "Recharge", value: recharge.label() },
        ReportTrait { label: "Pressure", value: pressure.label() },
    ];

    let mut tips = Vec::with_capacity(MAX_TIPS);
    tips.push(match approach {
        Approach::Planner => "Leave room for experimentation so plans stay flexible.",
        Approach::Adapter => "Add lightweight checkpoints to keep iteration focused.",
    });
    tips.push(match decisions {
        Decisions::Analytical => "Pair data with a clear value statement to avoid over-optimizing.",
        Decisions::ValuesLed => "Sanity-check priorities with one concrete metric.",
        Decisions::Intuitive => "Capture assumptions early so others can follow your reasoning.",
        Decisions::ConsensusDriven => "Timebox alignment to avoid slow decisions.",
    });
    tips.push(match pressure {
        Pressure::Calm => "Communicate your plan during pressure so others stay aligned.",
        Pressure::Energized => "Pause briefly before acting to reduce rework.",
        Pressure::Structured => "Start with the smallest actionable step to regain momentum.",
    });
    tips.truncate(MAX_TIPS);

    Report {
        title,
        summary,
        traits,
        tips,
    }
}

/// One bar of the per-question tally view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TallyRow {
    pub label: &'static str,
    pub count: u64,
    /// Bar width relative to the largest count, rounded to a whole percent.
    pub width_pct: u8,
}

pub fn tally_rows(question: u8, counts: &[u64; MAX_OPTIONS]) -> Result<Vec<TallyRow>> {
    let text = QUESTIONS
        .get(usize::from(question))
        .ok_or_else(|| error!(SurveyError::InvalidQuestion))?;
    let shown = &counts[..text.options.len().min(MAX_OPTIONS)];
    let max = u128::from(shown.iter().copied().max().unwrap_or(0).max(1));

    Ok(text
        .options
        .iter()
        .zip(shown)
        .map(|(&label, &count)| {
            let width = (u128::from(count) * 100 + max / 2) / max;
            TallyRow {
                label,
                count,
                width_pct: width.min(100) as u8,
            }
        })
        .collect())
}

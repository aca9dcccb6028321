//! Question texts of the deployed questionnaire.

use crate::constants::QUESTION_COUNT;

pub struct QuestionText {
    pub title: &'static str,
    pub options: &'static [&'static str],
}

pub const QUESTIONS: [QuestionText; QUESTION_COUNT] = [
    QuestionText {
        title: "When you start something new, you prefer to:",
        options: &["Plan first and then execute", "Start quickly and iterate"],
    },
    QuestionText {
        title: "In a group discussion, you usually:",
        options: &["Speak early", "Listen first then share", "Only speak if asked"],
    },
    QuestionText {
        title: "When making decisions, you rely most on:",
        options: &[
            "Data and evidence",
            "Values and principles",
            "Intuition and creativity",
            "Consensus and alignment",
        ],
    },
    QuestionText {
        title: "You recharge best by:",
        options: &["Quiet time alone", "Spending time with others"],
    },
    QuestionText {
        title: "Under pressure, you tend to:",
        options: &[
            "Stay calm and steady",
            "Get energized and act fast",
            "Look for structure and clear steps",
        ],
    },
];

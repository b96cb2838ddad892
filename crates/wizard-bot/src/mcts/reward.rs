use serde::{Deserialize, Serialize};
use wizard_core::model::player::Seat;
use wizard_core::model::round::RoundState;
use wizard_core::rules::score_bounds;

/// Turns a finished round into a value in `[0, 1]` for the searching seat.
pub trait RewardModel {
    fn reward(&self, terminal: &RoundState, seat: Seat) -> f64;
}

/// The seat's own round score, scaled between the worst and best score the
/// round allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedScore;

/// Own score minus the mean opponent score, scaled the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreMargin;

impl RewardModel for NormalizedScore {
    fn reward(&self, terminal: &RoundState, seat: Seat) -> f64 {
        let Some(scores) = terminal.round_scores() else {
            return 0.0;
        };
        let (low, high) = score_bounds(terminal.hand_size());
        let own = scores.get(seat.index()).copied().unwrap_or(low);
        normalize(f64::from(own - low), f64::from(high - low))
    }
}

impl RewardModel for ScoreMargin {
    fn reward(&self, terminal: &RoundState, seat: Seat) -> f64 {
        let Some(scores) = terminal.round_scores() else {
            return 0.0;
        };
        let (low, high) = score_bounds(terminal.hand_size());
        let span = f64::from(high - low);
        let own = f64::from(scores.get(seat.index()).copied().unwrap_or(low));
        let others: Vec<f64> = scores
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != seat.index())
            .map(|(_, score)| f64::from(*score))
            .collect();
        let mean = if others.is_empty() {
            own
        } else {
            others.iter().sum::<f64>() / others.len() as f64
        };
        normalize(own - mean + span, 2.0 * span)
    }
}

fn normalize(value: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    (value / span).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    #[default]
    NormalizedScore,
    ScoreMargin,
}

impl RewardKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normalized" | "normalized_score" | "score" => Some(RewardKind::NormalizedScore),
            "margin" | "score_margin" => Some(RewardKind::ScoreMargin),
            _ => None,
        }
    }
}

impl RewardModel for RewardKind {
    fn reward(&self, terminal: &RoundState, seat: Seat) -> f64 {
        match self {
            RewardKind::NormalizedScore => NormalizedScore.reward(terminal, seat),
            RewardKind::ScoreMargin => ScoreMargin.reward(terminal, seat),
        }
    }
}

// Probability-weighted pipeline forecast.
// Pure functions of the board snapshot: no I/O, no shared state.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Card, Stage};

/// How a stage's win probability is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    /// `prob` is the chance this deal ultimately closes.
    Absolute,
    /// `prob` is the chance of advancing to the next stage; the chance of
    /// closing is the product of transitions through the terminal stage.
    Transition,
}

impl ForecastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMode::Absolute => "absolute",
            ForecastMode::Transition => "transition",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "absolute" => Some(ForecastMode::Absolute),
            "transition" => Some(ForecastMode::Transition),
            _ => None,
        }
    }
}

/// Per-stage forecast figures
#[derive(Debug, Clone, Serialize)]
pub struct StageForecast {
    pub id: String,
    pub name: String,
    pub prob: f64,
    pub count: usize,
    pub total: f64,
    pub weighted: f64,
}

/// Whole-board forecast figures
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub total: f64,
    pub weighted: f64,
    pub per_stage: Vec<StageForecast>,
}

/// A stage's stored probability clamped into [0, 1].
/// Missing, non-finite, or out-of-range values coerce rather than reject.
fn clamped_prob(stage: &Stage) -> f64 {
    let p = stage.prob.unwrap_or(0.0) / 100.0;
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// A card's face value for aggregation; absent or non-finite counts as 0.
fn card_value(card: &Card) -> f64 {
    card.value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Cumulative probability-to-close per stage index, built as a reverse fold.
/// The terminal stage is an unconditional 1.0 in both modes, so a pipeline of
/// length 1 forecasts at full weight regardless of its stored probability.
fn prob_to_end(stages: &[Stage], mode: ForecastMode) -> Vec<f64> {
    let mut probs = vec![0.0; stages.len()];
    let mut acc = 1.0;
    for i in (0..stages.len()).rev() {
        if i == stages.len() - 1 {
            probs[i] = 1.0;
        } else {
            let p = clamped_prob(&stages[i]);
            probs[i] = match mode {
                ForecastMode::Absolute => p,
                ForecastMode::Transition => p * acc,
            };
        }
        acc = probs[i];
    }
    probs
}

/// Compute per-stage and total weighted/face values for the board.
pub fn forecast(
    stages: &[Stage],
    columns: &HashMap<String, Vec<Card>>,
    mode: ForecastMode,
) -> Forecast {
    static EMPTY: Vec<Card> = Vec::new();
    let probs = prob_to_end(stages, mode);

    let mut total = 0.0;
    let mut weighted = 0.0;
    let per_stage = stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let cards = columns.get(&stage.id).unwrap_or(&EMPTY);
            let stage_total: f64 = cards.iter().map(card_value).sum();
            let stage_weighted = stage_total * probs[i];
            total += stage_total;
            weighted += stage_weighted;
            StageForecast {
                id: stage.id.clone(),
                name: stage.name.clone(),
                prob: stage.prob.unwrap_or(0.0),
                count: cards.len(),
                total: stage_total,
                weighted: stage_weighted,
            }
        })
        .collect();

    Forecast {
        total,
        weighted,
        per_stage,
    }
}

//! Outcome heuristic: a rough interview/offer likelihood from the caller's own
//! track record, nudged by the company's sponsor rating. It is a heuristic,
//! not a statistical model.

mod weights;

pub use weights::{
    RatingWeights, BASELINE_INTERVIEW_RATE, BASELINE_OFFER_RATE, PROBABILITY_CEILING,
    PROBABILITY_FLOOR,
};

use serde::Serialize;

use super::domain::ApplicationStatus;
use crate::workflows::sponsors::SponsorRating;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub interview_probability: f64,
    pub offer_probability: f64,
    pub sample_size: usize,
}

/// Pure over its inputs; the order of `history` is irrelevant.
pub fn predict_outcome(rating: Option<&SponsorRating>, history: &[ApplicationStatus]) -> Prediction {
    let sample_size = history.len();
    let (interview_rate, offer_rate) = if sample_size == 0 {
        (BASELINE_INTERVIEW_RATE, BASELINE_OFFER_RATE)
    } else {
        let interviews = history
            .iter()
            .filter(|status| status.reached_interview())
            .count();
        let offers = history.iter().filter(|status| status.is_offer()).count();
        (
            interviews as f64 / sample_size as f64,
            offers as f64 / sample_size as f64,
        )
    };

    let weights = RatingWeights::for_rating(rating);
    Prediction {
        interview_probability: finalize(interview_rate * weights.interview),
        offer_probability: finalize(offer_rate * weights.offer),
        sample_size,
    }
}

fn finalize(probability: f64) -> f64 {
    round_to_cents(probability.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING))
}

/// Two decimal places, rounded on the exact binary value. Scaling by 100
/// first would turn 0.175 (stored as 0.17499...) into a tie and round it up.
pub(crate) fn round_to_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

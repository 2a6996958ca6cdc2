use crate::workflows::sponsors::SponsorRating;

/// Rates assumed for a caller with no application history.
pub const BASELINE_INTERVIEW_RATE: f64 = 0.15;
pub const BASELINE_OFFER_RATE: f64 = 0.05;

pub const PROBABILITY_FLOOR: f64 = 0.01;
pub const PROBABILITY_CEILING: f64 = 0.99;

/// Multipliers applied to the raw rates for a company's sponsor rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingWeights {
    pub interview: f64,
    pub offer: f64,
}

impl RatingWeights {
    pub const NEUTRAL: RatingWeights = RatingWeights {
        interview: 1.0,
        offer: 1.0,
    };

    /// A-rated sponsors get a boost, B-rated sponsors a penalty; unknown or
    /// legacy labels are left alone.
    pub fn for_rating(rating: Option<&SponsorRating>) -> Self {
        match rating {
            Some(SponsorRating::A) => RatingWeights {
                interview: 1.2,
                offer: 1.1,
            },
            Some(SponsorRating::B) => RatingWeights {
                interview: 0.8,
                offer: 0.7,
            },
            Some(SponsorRating::Other(_)) | None => Self::NEUTRAL,
        }
    }
}

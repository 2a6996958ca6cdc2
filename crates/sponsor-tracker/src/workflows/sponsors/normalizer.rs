use std::sync::OnceLock;

use regex::Regex;

use super::domain::SponsorRating;

fn rating_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([AB]) rating\)").expect("static rating pattern"))
}

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(normalize_text).filter(|v| !v.is_empty())
}

/// Register rows carry ratings like `Worker (A rating)`. Rows without a
/// recognisable rating are treated as A-rated.
pub(crate) fn extract_rating(type_and_rating: Option<&str>) -> SponsorRating {
    type_and_rating
        .and_then(|raw| rating_pattern().captures(raw))
        .and_then(|captures| captures.get(1))
        .map(|grade| SponsorRating::from(grade.as_str()))
        .unwrap_or(SponsorRating::A)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_strips_invisible_characters() {
        assert_eq!(
            normalize_text("\u{feff}  Acme   Widgets\tLtd "),
            "Acme Widgets Ltd"
        );
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn extracts_a_and_b_ratings() {
        assert_eq!(extract_rating(Some("Worker (A rating)")), SponsorRating::A);
        assert_eq!(
            extract_rating(Some("Temporary Worker (B rating)")),
            SponsorRating::B
        );
    }

    #[test]
    fn defaults_unrecognised_ratings_to_a() {
        assert_eq!(extract_rating(Some("Worker")), SponsorRating::A);
        assert_eq!(extract_rating(Some("Worker (C rating)")), SponsorRating::A);
        assert_eq!(extract_rating(None), SponsorRating::A);
    }
}

//! Display helpers over record fields.
//!
//! All pure functions; front ends decide layout.

use chrono::NaiveDate;
use data_loader::{ItemId, PlatformFlags, RatingLabel};

/// "Free" for absent or zero prices, otherwise dollars with cents
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p > 0.0 => format!("${:.2}", p),
        _ => "Free".to_string(),
    }
}

/// Star score out of 5 for a rating label
pub fn rating_score(label: RatingLabel) -> f32 {
    match label {
        RatingLabel::OverwhelminglyPositive => 5.0,
        RatingLabel::VeryPositive => 4.5,
        RatingLabel::MostlyPositive => 4.0,
        RatingLabel::Positive => 3.5,
        RatingLabel::Mixed => 3.0,
        RatingLabel::MostlyNegative => 2.0,
        RatingLabel::Negative => 2.0,
        RatingLabel::VeryNegative => 1.5,
        RatingLabel::OverwhelminglyNegative => 1.0,
    }
}

/// One star per whole point, plus a half mark
pub fn star_string(score: f32) -> String {
    let score = score.clamp(0.0, 5.0);
    let full = score.floor() as usize;
    let mut stars = "⭐".repeat(full);
    if score - score.floor() >= 0.5 {
        stars.push('½');
    }
    stars
}

/// e.g. `4.5/5.0 ⭐⭐⭐⭐½ (Very Positive)`
pub fn format_rating(label: Option<RatingLabel>) -> String {
    match label {
        Some(label) => {
            let score = rating_score(label);
            format!("{:.1}/5.0 {} ({})", score, star_string(score), label)
        }
        None => "Not Rated".to_string(),
    }
}

pub fn platform_labels(platforms: PlatformFlags) -> Vec<&'static str> {
    let mut labels = Vec::with_capacity(3);
    if platforms.windows {
        labels.push("Windows");
    }
    if platforms.mac {
        labels.push("macOS");
    }
    if platforms.linux {
        labels.push("Linux");
    }
    labels
}

/// `MM-DD-YYYY`
pub fn format_release_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%m-%d-%Y").to_string(),
        None => "Unknown".to_string(),
    }
}

pub fn format_reviews(count: Option<u64>) -> String {
    match count {
        Some(count) => format!("{} reviews", count),
        None => "N/A".to_string(),
    }
}

pub fn store_url(id: ItemId) -> String {
    format!("https://store.steampowered.com/app/{}/", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(None), "Free");
        assert_eq!(format_price(Some(0.0)), "Free");
        assert_eq!(format_price(Some(12.99)), "$12.99");
        assert_eq!(format_price(Some(5.0)), "$5.00");
    }

    #[test]
    fn test_star_string() {
        assert_eq!(star_string(4.5), "⭐⭐⭐⭐½");
        assert_eq!(star_string(2.0), "⭐⭐");
        assert_eq!(star_string(0.0), "");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(
            format_rating(Some(RatingLabel::VeryPositive)),
            "4.5/5.0 ⭐⭐⭐⭐½ (Very Positive)"
        );
        assert_eq!(
            format_rating(Some(RatingLabel::Mixed)),
            "3.0/5.0 ⭐⭐⭐ (Mixed)"
        );
        assert_eq!(format_rating(None), "Not Rated");
    }

    #[test]
    fn test_rating_scores_in_range() {
        for label in RatingLabel::ALL {
            let score = rating_score(label);
            assert!((1.0..=5.0).contains(&score), "{} scored {}", label, score);
        }
        assert_eq!(rating_score(RatingLabel::MostlyPositive), 4.0);
        assert_eq!(rating_score(RatingLabel::Positive), 3.5);
    }

    #[test]
    fn test_platform_labels() {
        let all = PlatformFlags {
            windows: true,
            mac: true,
            linux: true,
        };
        assert_eq!(platform_labels(all), vec!["Windows", "macOS", "Linux"]);
        assert!(platform_labels(PlatformFlags::default()).is_empty());
    }

    #[test]
    fn test_format_release_date() {
        let date = NaiveDate::from_ymd_opt(2011, 4, 18);
        assert_eq!(format_release_date(date), "04-18-2011");
        assert_eq!(format_release_date(None), "Unknown");
    }

    #[test]
    fn test_format_reviews_and_url() {
        assert_eq!(format_reviews(Some(1234)), "1234 reviews");
        assert_eq!(format_reviews(None), "N/A");
        assert_eq!(store_url(620), "https://store.steampowered.com/app/620/");
    }
}

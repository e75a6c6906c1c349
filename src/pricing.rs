//! Price and rating arithmetic shared by the catalog, cart and checkout.

use serde::Serialize;
use utoipa::ToSchema;

/// Price after applying a percentage discount, in minor units.
///
/// Rounds half-up to the nearest minor unit. `discount` is clamped to
/// `0..=100` so a corrupt row can never yield a negative charge.
pub fn final_price(price: i64, discount: i32) -> i64 {
    let discount = i64::from(discount.clamp(0, 100));
    let price = price.max(0);
    (price * (100 - discount) + 50) / 100
}

/// Sum of the discounted prices of `(price, discount)` pairs.
pub fn cart_subtotal<I>(items: I) -> i64
where
    I: IntoIterator<Item = (i64, i32)>,
{
    items
        .into_iter()
        .map(|(price, discount)| final_price(price, discount))
        .sum()
}

pub fn validate_discount(discount: i32) -> Result<(), String> {
    if (0..=100).contains(&discount) {
        Ok(())
    } else {
        Err("discount must be between 0 and 100".to_string())
    }
}

pub fn validate_price(price: i64) -> Result<(), String> {
    if price >= 0 {
        Ok(())
    } else {
        Err("price must not be negative".to_string())
    }
}

pub fn validate_rating(rating: i32) -> Result<(), String> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err("rating must be between 1 and 5".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct RatingSummary {
    pub count: i64,
    /// Mean rating rounded to one decimal, 0 when unrated.
    pub average: f64,
    /// Whole stars to display: the floor of the mean.
    pub stars: i32,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let count = ratings.len() as i64;
        let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        Self::from_totals(count, total)
    }

    pub fn from_totals(count: i64, total: i64) -> Self {
        if count == 0 {
            return Self {
                count: 0,
                average: 0.0,
                stars: 0,
            };
        }
        let mean = total as f64 / count as f64;
        Self {
            count,
            average: (mean * 10.0).round() / 10.0,
            stars: (total / count) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_price_applies_percentage() {
        assert_eq!(final_price(10_000, 0), 10_000);
        assert_eq!(final_price(10_000, 25), 7_500);
        assert_eq!(final_price(10_000, 100), 0);
    }

    #[test]
    fn final_price_rounds_half_up() {
        // 1999 * 0.85 = 1699.15
        assert_eq!(final_price(1_999, 15), 1_699);
        // 999 * 0.5 = 499.5
        assert_eq!(final_price(999, 50), 500);
    }

    #[test]
    fn final_price_clamps_out_of_range_discount() {
        assert_eq!(final_price(5_000, 150), 0);
        assert_eq!(final_price(5_000, -10), 5_000);
    }

    #[test]
    fn subtotal_sums_discounted_prices() {
        let subtotal = cart_subtotal(vec![(10_000, 10), (5_000, 0), (2_000, 50)]);
        assert_eq!(subtotal, 9_000 + 5_000 + 1_000);
        assert_eq!(cart_subtotal(Vec::new()), 0);
    }

    #[test]
    fn validators_enforce_ranges() {
        assert!(validate_discount(0).is_ok());
        assert!(validate_discount(100).is_ok());
        assert!(validate_discount(101).is_err());
        assert!(validate_discount(-1).is_err());
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-5).is_err());
    }

    #[test]
    fn rating_summary_floors_stars() {
        let summary = RatingSummary::from_ratings(&[5, 4, 4]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.stars, 4);
        assert_eq!(summary.average, 4.3);
    }

    #[test]
    fn rating_summary_empty_is_zero() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.stars, 0);
        assert_eq!(summary.average, 0.0);
    }
}

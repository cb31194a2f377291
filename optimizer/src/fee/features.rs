//! Feature vectors for the fee model

use aifi_corridors::{Corridor, ProviderKind};

use crate::types::TimeContext;

/// Number of model features
pub const FEATURE_COUNT: usize = 12;

/// Dense feature vector in [`FEATURE_NAMES`] order
pub type FeatureVector = [f64; FEATURE_COUNT];

pub const AMOUNT: usize = 0;
pub const BASE_FEE_PERCENT: usize = 1;
pub const FIXED_FEE: usize = 2;
pub const MIN_FEE: usize = 3;
pub const MAX_FEE: usize = 4;
pub const FEE_TYPE: usize = 5;
pub const AVG_TIME_HOURS: usize = 6;
pub const RELIABILITY_SCORE: usize = 7;
pub const HOUR_OF_DAY: usize = 8;
pub const DAY_OF_WEEK: usize = 9;
pub const IS_WEEKEND: usize = 10;
pub const PROVIDER: usize = 11;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "amount",
    "base_fee_percent",
    "fixed_fee",
    "min_fee",
    "max_fee",
    "is_percentage",
    "avg_time_hours",
    "reliability_score",
    "hour_of_day",
    "day_of_week",
    "is_weekend",
    "provider",
];

/// Build the feature vector for pricing `amount` on `corridor`
pub fn build_features(
    corridor: &Corridor,
    amount: f64,
    time: TimeContext,
    provider: ProviderKind,
) -> FeatureVector {
    let mut features = [0.0; FEATURE_COUNT];
    features[AMOUNT] = amount;
    features[BASE_FEE_PERCENT] = corridor.base_fee_percent;
    features[FIXED_FEE] = corridor.fixed_fee;
    features[MIN_FEE] = corridor.min_fee;
    features[MAX_FEE] = corridor.max_fee;
    features[FEE_TYPE] = corridor.fee_type.indicator();
    features[AVG_TIME_HOURS] = corridor.avg_time_hours;
    features[RELIABILITY_SCORE] = corridor.reliability_score;
    features[HOUR_OF_DAY] = time.hour_of_day as f64;
    features[DAY_OF_WEEK] = time.day_of_week as f64;
    features[IS_WEEKEND] = if time.is_weekend() { 1.0 } else { 0.0 };
    features[PROVIDER] = provider.ordinal() as f64;
    features
}

/// Corridor tariff recomputed from a feature vector
///
/// Percentage or flat fee, clamped to the min/max fee features. Matches
/// `Corridor::tariff_fee` for vectors built by [`build_features`].
pub fn tariff_fee(features: &FeatureVector) -> f64 {
    let raw = if features[FEE_TYPE] >= 0.5 {
        features[AMOUNT] * (features[BASE_FEE_PERCENT] / 100.0)
    } else {
        features[FIXED_FEE]
    };
    raw.max(features[MIN_FEE]).min(features[MAX_FEE])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_layout() {
        let corridor = Corridor::percentage("US", "MEX", 2.0, 2.0, 100.0)
            .with_time(6.0)
            .with_reliability(97.0);
        let features = build_features(&corridor, 1000.0, TimeContext::new(14, 6), ProviderKind::Crypto);

        assert_eq!(
            features,
            [1000.0, 2.0, 0.0, 2.0, 100.0, 1.0, 6.0, 97.0, 14.0, 6.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_tariff_matches_corridor() {
        let corridors = [
            Corridor::percentage("US", "MEX", 2.0, 2.0, 100.0),
            Corridor::fixed("US", "PHL", 12.0, 5.0, 60.0),
            Corridor::fixed("US", "IND", 3.0, 5.0, 60.0),
        ];

        for corridor in &corridors {
            for amount in [10.0, 250.0, 1000.0, 9000.0] {
                let features =
                    build_features(corridor, amount, TimeContext::new(0, 0), ProviderKind::Bank);
                assert_eq!(tariff_fee(&features), corridor.tariff_fee(amount));
            }
        }
    }
}

//! Follow-up pricing.

use serde::{Deserialize, Serialize};

use crate::models::FollowUpPeriod;

/// Price per follow-up period, in minor currency units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingTable {
    #[serde(rename = "2w")]
    pub two_weeks: u64,
    #[serde(rename = "4w")]
    pub four_weeks: u64,
    #[serde(rename = "6w")]
    pub six_weeks: u64,
    pub custom: u64,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            two_weeks: 7_500,
            four_weeks: 12_500,
            six_weeks: 17_500,
            custom: 20_000,
        }
    }
}

impl PricingTable {
    pub fn price_for(&self, period: FollowUpPeriod) -> u64 {
        match period {
            FollowUpPeriod::TwoWeeks => self.two_weeks,
            FollowUpPeriod::FourWeeks => self.four_weeks,
            FollowUpPeriod::SixWeeks => self.six_weeks,
            FollowUpPeriod::Custom => self.custom,
        }
    }

    /// Price for a period code. Unknown codes are charged the custom price.
    pub fn price_for_follow_up(&self, code: &str) -> u64 {
        self.price_for(FollowUpPeriod::from_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let table = PricingTable::default();
        assert_eq!(table.price_for_follow_up("2w"), table.two_weeks);
        assert_eq!(table.price_for_follow_up("4w"), table.four_weeks);
        assert_eq!(table.price_for_follow_up("6w"), table.six_weeks);
        assert_eq!(table.price_for_follow_up("custom"), table.custom);
    }

    #[test]
    fn test_unknown_code_uses_custom_price() {
        let table = PricingTable::default();
        assert_eq!(
            table.price_for_follow_up("unknown_code"),
            table.price_for_follow_up("custom")
        );
        assert_eq!(table.price_for_follow_up(""), table.custom);
    }

    #[test]
    fn test_table_from_json() {
        let table: PricingTable =
            serde_json::from_str(r#"{"2w":1000,"4w":2000,"6w":3000,"custom":4000}"#).unwrap();
        assert_eq!(table.price_for_follow_up("4w"), 2000);
        assert_eq!(table.price_for_follow_up("12w"), 4000);
    }
}

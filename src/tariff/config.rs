use serde::{Deserialize, Serialize};
use sunledger_quantities::rate::KilowattHourRate;

use crate::prelude::*;

/// Tariff configuration as it is stored and exchanged.
///
/// Range strings are kept verbatim so that the document round-trips exactly. Use
/// [`Tariff::try_from`][crate::tariff::Tariff] to validate it and fill in the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffConfig {
    pub peak_price: KilowattHourRate,
    pub valley_price: KilowattHourRate,
    pub flat_price: KilowattHourRate,

    /// `HH:MM-HH:MM` ranges.
    pub peak_hours: Vec<String>,

    /// `HH:MM-HH:MM` ranges.
    pub valley_hours: Vec<String>,

    /// Informational only: anything outside the peak and valley hours is flat anyway.
    pub flat_hours: Vec<String>,

    /// Generation subsidy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsidy_price: Option<KilowattHourRate>,

    /// Feed-in price for the energy exported to the grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_price: Option<KilowattHourRate>,
}

impl TariffConfig {
    pub const DEFAULT_SUBSIDY_PRICE: f64 = 0.0;
    pub const DEFAULT_GRID_PRICE: f64 = 0.35;

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse the tariff configuration")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize the tariff configuration")
    }
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            peak_price: KilowattHourRate::from(0.8),
            valley_price: KilowattHourRate::from(0.3),
            flat_price: KilowattHourRate::from(0.5),
            peak_hours: vec!["08:00-11:00".to_owned(), "18:00-22:00".to_owned()],
            valley_hours: vec!["00:00-06:00".to_owned()],
            flat_hours: vec![
                "06:00-08:00".to_owned(),
                "11:00-18:00".to_owned(),
                "22:00-24:00".to_owned(),
            ],
            subsidy_price: Some(KilowattHourRate::from(0.42)),
            grid_price: Some(KilowattHourRate::from(0.35)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let json = r#"{
            "peakPrice": 0.8,
            "valleyPrice": 0.3,
            "flatPrice": 0.5,
            "peakHours": ["08:00-11:00", "18:00-22:00"],
            "valleyHours": ["22:00-06:00"],
            "flatHours": ["06:00-08:00", "11:00-18:00", "22:00-24:00"],
            "gridPrice": 0.4
        }"#;
        let config = TariffConfig::from_json(json).unwrap();
        assert_eq!(config.valley_hours, ["22:00-06:00"]);
        assert_eq!(config.flat_hours[2], "22:00-24:00");
        assert_eq!(config.subsidy_price, None);
        assert_eq!(config.grid_price, Some(KilowattHourRate::from(0.4)));

        let serialized = config.to_json().unwrap();
        assert!(serialized.contains(r#""22:00-24:00""#));
        assert!(!serialized.contains("subsidyPrice"));
        assert_eq!(TariffConfig::from_json(&serialized).unwrap(), config);
    }

    #[test]
    fn test_default_round_trip() {
        let config = TariffConfig::default();
        assert_eq!(TariffConfig::from_json(&config.to_json().unwrap()).unwrap(), config);
    }

    #[test]
    fn test_missing_price() {
        let json = r#"{"peakPrice": 0.8, "valleyPrice": 0.3, "peakHours": [], "valleyHours": [], "flatHours": []}"#;
        assert!(TariffConfig::from_json(json).is_err());
    }
}

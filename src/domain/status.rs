// Status classification over fixed weather thresholds
use serde::Serialize;
use std::fmt;

/// Meters per second to kilometers per hour
pub const MS_TO_KMH: f64 = 3.6;

/// Rain-level increase below which the trend counts as drizzle
pub const DRIZZLE_THRESHOLD: f64 = 0.0006;

pub fn ms_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * MS_TO_KMH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UvStatus {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvStatus {
    pub fn classify(uv_index: f64) -> Self {
        if uv_index < 3.0 {
            UvStatus::Low
        } else if uv_index < 6.0 {
            UvStatus::Moderate
        } else if uv_index < 8.0 {
            UvStatus::High
        } else if uv_index < 11.0 {
            UvStatus::VeryHigh
        } else {
            UvStatus::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvStatus::Low => "low",
            UvStatus::Moderate => "moderate",
            UvStatus::High => "high",
            UvStatus::VeryHigh => "very-high",
            UvStatus::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HumidityStatus {
    Dry,
    Comfortable,
    Humid,
}

impl HumidityStatus {
    pub fn classify(humidity: f64) -> Self {
        if humidity < 30.0 {
            HumidityStatus::Dry
        } else if humidity < 60.0 {
            HumidityStatus::Comfortable
        } else {
            HumidityStatus::Humid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HumidityStatus::Dry => "dry",
            HumidityStatus::Comfortable => "comfortable",
            HumidityStatus::Humid => "humid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemperatureStatus {
    IntenseCold,
    Cold,
    Pleasant,
    Hot,
    ExtremeHeat,
}

impl TemperatureStatus {
    pub fn classify(celsius: f64) -> Self {
        if celsius < 10.0 {
            TemperatureStatus::IntenseCold
        } else if celsius < 20.0 {
            TemperatureStatus::Cold
        } else if celsius < 25.0 {
            TemperatureStatus::Pleasant
        } else if celsius < 30.0 {
            TemperatureStatus::Hot
        } else {
            TemperatureStatus::ExtremeHeat
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureStatus::IntenseCold => "intense-cold",
            TemperatureStatus::Cold => "cold",
            TemperatureStatus::Pleasant => "pleasant",
            TemperatureStatus::Hot => "hot",
            TemperatureStatus::ExtremeHeat => "extreme-heat",
        }
    }
}

/// Nine-level wind scale, from calm air to cyclone-force wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindSpeedStatus {
    Calm,
    LightBreeze,
    FreshBreeze,
    ModerateWind,
    StrongWind,
    VeryStrongWind,
    SevereGale,
    Storm,
    TropicalCyclone,
}

impl WindSpeedStatus {
    /// Classifies a speed already converted to km/h.
    pub fn classify(speed_kmh: f64) -> Self {
        if speed_kmh == 0.0 {
            WindSpeedStatus::Calm
        } else if speed_kmh < 12.0 {
            WindSpeedStatus::LightBreeze
        } else if speed_kmh < 20.0 {
            WindSpeedStatus::FreshBreeze
        } else if speed_kmh < 41.0 {
            WindSpeedStatus::ModerateWind
        } else if speed_kmh < 62.0 {
            WindSpeedStatus::StrongWind
        } else if speed_kmh < 75.0 {
            WindSpeedStatus::VeryStrongWind
        } else if speed_kmh < 103.0 {
            WindSpeedStatus::SevereGale
        } else if speed_kmh < 120.0 {
            WindSpeedStatus::Storm
        } else {
            WindSpeedStatus::TropicalCyclone
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindSpeedStatus::Calm => "calm",
            WindSpeedStatus::LightBreeze => "light-breeze",
            WindSpeedStatus::FreshBreeze => "fresh-breeze",
            WindSpeedStatus::ModerateWind => "moderate-wind",
            WindSpeedStatus::StrongWind => "strong-wind",
            WindSpeedStatus::VeryStrongWind => "very-strong-wind",
            WindSpeedStatus::SevereGale => "severe-gale",
            WindSpeedStatus::Storm => "storm",
            WindSpeedStatus::TropicalCyclone => "tropical-cyclone",
        }
    }
}

/// Rain trend between two consecutive readings of the cumulative rain gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RainStatus {
    NotRaining,
    Drizzling,
    Raining,
}

impl RainStatus {
    pub fn classify(current_level: f64, previous_level: f64) -> Self {
        let difference = current_level - previous_level;
        if difference <= 0.0 {
            RainStatus::NotRaining
        } else if difference < DRIZZLE_THRESHOLD {
            RainStatus::Drizzling
        } else {
            RainStatus::Raining
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RainStatus::NotRaining => "not-raining",
            RainStatus::Drizzling => "drizzling",
            RainStatus::Raining => "raining",
        }
    }
}

macro_rules! impl_display_label {
    ($($status:ty),*) => {
        $(
            impl fmt::Display for $status {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

impl_display_label!(UvStatus, HumidityStatus, TemperatureStatus, WindSpeedStatus, RainStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_band_boundaries() {
        assert_eq!(TemperatureStatus::classify(24.9), TemperatureStatus::Pleasant);
        assert_eq!(TemperatureStatus::classify(25.0), TemperatureStatus::Hot);
        assert_eq!(TemperatureStatus::classify(9.99), TemperatureStatus::IntenseCold);
        assert_eq!(TemperatureStatus::classify(10.0), TemperatureStatus::Cold);
        assert_eq!(TemperatureStatus::classify(30.0), TemperatureStatus::ExtremeHeat);
    }

    #[test]
    fn test_uv_bands() {
        assert_eq!(UvStatus::classify(0.0), UvStatus::Low);
        assert_eq!(UvStatus::classify(3.0), UvStatus::Moderate);
        assert_eq!(UvStatus::classify(7.9), UvStatus::High);
        assert_eq!(UvStatus::classify(8.0), UvStatus::VeryHigh);
        assert_eq!(UvStatus::classify(11.0), UvStatus::Extreme);
    }

    #[test]
    fn test_humidity_bands() {
        assert_eq!(HumidityStatus::classify(29.9), HumidityStatus::Dry);
        assert_eq!(HumidityStatus::classify(30.0), HumidityStatus::Comfortable);
        assert_eq!(HumidityStatus::classify(60.0), HumidityStatus::Humid);
    }

    #[test]
    fn test_wind_speed_scale() {
        assert_eq!(WindSpeedStatus::classify(0.0), WindSpeedStatus::Calm);
        assert_eq!(WindSpeedStatus::classify(0.1), WindSpeedStatus::LightBreeze);
        assert_eq!(WindSpeedStatus::classify(19.9), WindSpeedStatus::FreshBreeze);
        assert_eq!(WindSpeedStatus::classify(103.0), WindSpeedStatus::Storm);
        assert_eq!(WindSpeedStatus::classify(120.0), WindSpeedStatus::TropicalCyclone);

        let kmh = ms_to_kmh(10.0);
        assert!((kmh - 36.0).abs() < 1e-9);
        assert_eq!(WindSpeedStatus::classify(kmh), WindSpeedStatus::ModerateWind);
    }

    #[test]
    fn test_rain_trend() {
        assert_eq!(RainStatus::classify(1.0, 1.0), RainStatus::NotRaining);
        assert_eq!(RainStatus::classify(0.5, 1.0), RainStatus::NotRaining);
        assert_eq!(RainStatus::classify(0.0003, 0.0), RainStatus::Drizzling);
        assert_eq!(RainStatus::classify(0.0006, 0.0), RainStatus::Raining);
    }

    #[test]
    fn test_labels_match_serialization() {
        assert_eq!(WindSpeedStatus::ModerateWind.to_string(), "moderate-wind");
        assert_eq!(
            serde_json::to_value(WindSpeedStatus::ModerateWind).unwrap(),
            serde_json::json!("moderate-wind")
        );
        assert_eq!(
            serde_json::to_value(TemperatureStatus::IntenseCold).unwrap(),
            serde_json::json!(TemperatureStatus::IntenseCold.label())
        );
    }
}

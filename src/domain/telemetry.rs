// Sensor telemetry domain models

/// Measurement fields carried by a weather station reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    RainLevel,
    AverageWindSpeed,
    WindDirection,
    Humidity,
    UvIndex,
    SolarRadiation,
    Temperature,
}

impl SensorField {
    pub const ALL: [SensorField; 7] = [
        SensorField::RainLevel,
        SensorField::AverageWindSpeed,
        SensorField::WindDirection,
        SensorField::Humidity,
        SensorField::UvIndex,
        SensorField::SolarRadiation,
        SensorField::Temperature,
    ];

    /// Tag used by the station firmware in published payloads
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "emw_rain_level" => Some(SensorField::RainLevel),
            "emw_average_wind_speed" => Some(SensorField::AverageWindSpeed),
            "emw_wind_direction" => Some(SensorField::WindDirection),
            "emw_humidity" => Some(SensorField::Humidity),
            "emw_uv" => Some(SensorField::UvIndex),
            "emw_solar_radiation" => Some(SensorField::SolarRadiation),
            "emw_temperature" => Some(SensorField::Temperature),
            _ => None,
        }
    }

    /// Column (field key) name in the time-series store
    pub fn column(&self) -> &'static str {
        match self {
            SensorField::RainLevel => "rain_level",
            SensorField::AverageWindSpeed => "average_wind_speed",
            SensorField::WindDirection => "wind_direction",
            SensorField::Humidity => "humidity",
            SensorField::UvIndex => "uv_index",
            SensorField::SolarRadiation => "solar_radiation",
            SensorField::Temperature => "temperature",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == column)
    }
}

/// One decoded observation, keyed by ingestion time in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorRecord {
    pub timestamp: i64,
    pub rain_level: f64,
    /// Meters per second, as reported by the anemometer
    pub average_wind_speed: f64,
    /// Radians, not wrapped
    pub wind_direction: f64,
    pub humidity: f64,
    pub uv_index: f64,
    pub solar_radiation: f64,
    pub temperature: f64,
}

impl SensorRecord {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn set(&mut self, field: SensorField, value: f64) {
        match field {
            SensorField::RainLevel => self.rain_level = value,
            SensorField::AverageWindSpeed => self.average_wind_speed = value,
            SensorField::WindDirection => self.wind_direction = value,
            SensorField::Humidity => self.humidity = value,
            SensorField::UvIndex => self.uv_index = value,
            SensorField::SolarRadiation => self.solar_radiation = value,
            SensorField::Temperature => self.temperature = value,
        }
    }

    pub fn get(&self, field: SensorField) -> f64 {
        match field {
            SensorField::RainLevel => self.rain_level,
            SensorField::AverageWindSpeed => self.average_wind_speed,
            SensorField::WindDirection => self.wind_direction,
            SensorField::Humidity => self.humidity,
            SensorField::UvIndex => self.uv_index,
            SensorField::SolarRadiation => self.solar_radiation,
            SensorField::Temperature => self.temperature,
        }
    }
}

/// A persisted row as read back from storage.
///
/// Every measurement is optional: a field the store has no value for is
/// `None`, never a fabricated zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoredReading {
    pub timestamp: i64,
    pub rain_level: Option<f64>,
    pub average_wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub humidity: Option<f64>,
    pub uv_index: Option<f64>,
    pub solar_radiation: Option<f64>,
    pub temperature: Option<f64>,
}

impl StoredReading {
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn get(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::RainLevel => self.rain_level,
            SensorField::AverageWindSpeed => self.average_wind_speed,
            SensorField::WindDirection => self.wind_direction,
            SensorField::Humidity => self.humidity,
            SensorField::UvIndex => self.uv_index,
            SensorField::SolarRadiation => self.solar_radiation,
            SensorField::Temperature => self.temperature,
        }
    }

    pub fn set(&mut self, field: SensorField, value: Option<f64>) {
        match field {
            SensorField::RainLevel => self.rain_level = value,
            SensorField::AverageWindSpeed => self.average_wind_speed = value,
            SensorField::WindDirection => self.wind_direction = value,
            SensorField::Humidity => self.humidity = value,
            SensorField::UvIndex => self.uv_index = value,
            SensorField::SolarRadiation => self.solar_radiation = value,
            SensorField::Temperature => self.temperature = value,
        }
    }

    /// Field value with the zero fallback applied
    pub fn value_or_zero(&self, field: SensorField) -> f64 {
        self.get(field).unwrap_or(0.0)
    }
}

impl From<SensorRecord> for StoredReading {
    fn from(record: SensorRecord) -> Self {
        let mut reading = StoredReading::empty(record.timestamp);
        for field in SensorField::ALL {
            reading.set(field, Some(record.get(field)));
        }
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_column_mapping() {
        assert_eq!(SensorField::from_tag("emw_uv"), Some(SensorField::UvIndex));
        assert_eq!(SensorField::from_tag("emw_unknown"), None);
        for field in SensorField::ALL {
            assert_eq!(SensorField::from_column(field.column()), Some(field));
        }
    }

    #[test]
    fn test_stored_reading_from_record() {
        let mut record = SensorRecord::new(1_700_000_000);
        record.set(SensorField::Temperature, 21.5);

        let reading = StoredReading::from(record);
        assert_eq!(reading.timestamp, 1_700_000_000);
        assert_eq!(reading.temperature, Some(21.5));
        assert_eq!(reading.humidity, Some(0.0));
    }

    #[test]
    fn test_value_or_zero() {
        let reading = StoredReading::empty(10);
        assert_eq!(reading.get(SensorField::Humidity), None);
        assert_eq!(reading.value_or_zero(SensorField::Humidity), 0.0);
    }
}

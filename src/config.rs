//! Simulation configuration and its validation.

/// The configuration of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// The logical width of the map bounds.
    pub width: f64,
    /// The logical height of the map bounds.
    pub height: f64,
    /// The number of simulation ticks per second.
    pub tick_rate: f64,
    /// The maximum number of concurrent vehicles.
    pub max_vehicles: usize,
    /// The simulated hour the run begins at, in `[0, 24)`.
    pub initial_hour: f64,
    /// Whether event sinks receive notifications.
    pub events_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1000.0,
            tick_rate: 60.0,
            max_vehicles: 120,
            initial_hour: 8.0,
            events_enabled: true,
        }
    }
}

/// An error found while validating a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is not positive.
    InvalidBounds,
    /// The tick rate is not positive.
    InvalidTickRate,
    /// The vehicle capacity is zero.
    InvalidCapacity,
    /// The hour is outside `[0, 24)`.
    InvalidHour,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBounds => write!(f, "bounds must be positive"),
            Self::InvalidTickRate => write!(f, "tick rate must be positive"),
            Self::InvalidCapacity => write!(f, "maximum vehicle count must be positive"),
            Self::InvalidHour => write!(f, "hour must be in [0, 24)"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl SimulationConfig {
    /// Validates the configuration. Out-of-range values are rejected,
    /// never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::InvalidBounds);
        }
        if self.tick_rate <= 0.0 {
            return Err(ConfigError::InvalidTickRate);
        }
        if self.max_vehicles == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        validate_hour(self.initial_hour)
    }
}

/// Validates a simulated hour value.
pub(crate) fn validate_hour(hour: f64) -> Result<(), ConfigError> {
    if (0.0..24.0).contains(&hour) {
        Ok(())
    } else {
        Err(ConfigError::InvalidHour)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_bounds() {
        let config = SimulationConfig {
            width: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBounds));
        let config = SimulationConfig {
            height: -10.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBounds));
    }

    #[test]
    fn rejects_zero_tick_rate_and_capacity() {
        let config = SimulationConfig {
            tick_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickRate));
        let config = SimulationConfig {
            max_vehicles: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidCapacity));
    }

    #[test]
    fn rejects_out_of_range_hour() {
        for hour in [-0.1, 24.0, 30.0] {
            let config = SimulationConfig {
                initial_hour: hour,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidHour));
        }
        let config = SimulationConfig {
            initial_hour: 23.99,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }
}

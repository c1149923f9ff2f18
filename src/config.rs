use crate::error::{BridgeError, Result};
use crate::matter::clusters::occupancy_sensing::OccupancySensorType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
const APP_DIR: &str = "matter-sensor-bridge";

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let Ok(content) = fs::read_to_string(".env") else {
        return;
    };

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);

            // Only set if not already set (env vars take precedence)
            if std::env::var(key).is_err() {
                // SAFETY: called before the runtime and the stack thread start
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub sensors: SensorsConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Aggregator endpoint the bridged endpoints hang off
    pub aggregator_endpoint_id: u16,
    pub first_dynamic_endpoint_id: u16,
    /// Number of dynamic endpoint slots in the table
    pub dynamic_endpoint_capacity: usize,
    /// Byte budget for endpoint resources; unlimited when absent
    pub heap_budget: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub temperature: TemperatureConfig,
    pub humidity: HumidityConfig,
    pub occupancy: OccupancyConfig,
    pub switch: SwitchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    pub name: String,
    /// Hundredths of a degree Celsius
    pub min_centidegrees: i16,
    pub max_centidegrees: i16,
    pub initial_celsius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HumidityConfig {
    pub name: String,
    pub initial_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyConfig {
    pub name: String,
    pub sensor_type: OccupancySensorType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    pub name: String,
    pub initially_on: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            aggregator_endpoint_id: 1,
            first_dynamic_endpoint_id: 2,
            dynamic_endpoint_capacity: 16,
            heap_budget: None,
        }
    }
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            name: "Temperature".to_string(),
            min_centidegrees: -4000,
            max_centidegrees: 10000,
            initial_celsius: 21.0,
        }
    }
}

impl Default for HumidityConfig {
    fn default() -> Self {
        Self {
            name: "Humidity".to_string(),
            initial_percent: 45.0,
        }
    }
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            name: "Occupancy".to_string(),
            sensor_type: OccupancySensorType::Pir,
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            name: "Switch".to_string(),
            initially_on: false,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
        }
    }
}

impl Config {
    /// `<config dir>/matter-sensor-bridge/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present, else built-in defaults. Environment overrides are applied
    /// last, then the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading configuration from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `BRIDGE_*` and `SIMULATION_*` overrides looked up through `var`.
    /// Values that fail to parse are ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(id) = var("BRIDGE_AGGREGATOR_ENDPOINT")
            && let Ok(id) = id.parse()
        {
            self.bridge.aggregator_endpoint_id = id;
        }
        if let Some(id) = var("BRIDGE_FIRST_ENDPOINT")
            && let Ok(id) = id.parse()
        {
            self.bridge.first_dynamic_endpoint_id = id;
        }
        if let Some(capacity) = var("BRIDGE_ENDPOINT_CAPACITY")
            && let Ok(capacity) = capacity.parse()
        {
            self.bridge.dynamic_endpoint_capacity = capacity;
        }
        if let Some(budget) = var("BRIDGE_HEAP_BUDGET")
            && let Ok(budget) = budget.parse()
        {
            self.bridge.heap_budget = Some(budget);
        }
        if let Some(enabled) = var("SIMULATION_ENABLED")
            && let Ok(enabled) = enabled.parse()
        {
            self.simulation.enabled = enabled;
        }
        if let Some(interval) = var("SIMULATION_INTERVAL_SECS")
            && let Ok(interval) = interval.parse()
        {
            self.simulation.interval_secs = interval;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let bridge = &self.bridge;
        if bridge.dynamic_endpoint_capacity == 0 {
            return Err(BridgeError::InvalidConfig(
                "dynamic_endpoint_capacity must be at least 1".to_string(),
            ));
        }
        if bridge.first_dynamic_endpoint_id <= bridge.aggregator_endpoint_id
            || bridge.first_dynamic_endpoint_id == u16::MAX
        {
            return Err(BridgeError::InvalidConfig(format!(
                "first_dynamic_endpoint_id {} must be above aggregator endpoint {}",
                bridge.first_dynamic_endpoint_id, bridge.aggregator_endpoint_id
            )));
        }
        let id_space = usize::from(u16::MAX - bridge.first_dynamic_endpoint_id);
        if bridge.dynamic_endpoint_capacity > id_space {
            return Err(BridgeError::InvalidConfig(format!(
                "dynamic_endpoint_capacity {} exceeds the {} endpoint ids from {}",
                bridge.dynamic_endpoint_capacity, id_space, bridge.first_dynamic_endpoint_id
            )));
        }
        let temperature = &self.sensors.temperature;
        if temperature.min_centidegrees > temperature.max_centidegrees {
            return Err(BridgeError::InvalidConfig(format!(
                "temperature range [{}, {}] is empty",
                temperature.min_centidegrees, temperature.max_centidegrees
            )));
        }
        if self.simulation.enabled && self.simulation.interval_secs == 0 {
            return Err(BridgeError::InvalidConfig(
                "simulation.interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//! Layered settings: built-in defaults, then a TOML file, then
//! `FLYPATH_`-prefixed environment variables.
//!
//! Nested keys use a double underscore in the environment:
//! - `FLYPATH_AMADEUS__CLIENT_ID` sets `amadeus.client_id`
//! - `FLYPATH_HTTP__TIMEOUT=60` sets `http.timeout`
//! - `FLYPATH_COST__DEFAULT_AIRPORT_FEE=1500` sets `cost.default_airport_fee`
//!
//! ```toml
//! currency = "EUR"
//!
//! [amadeus]
//! client_id = "..."
//! client_secret = "..."
//!
//! [cost.aircraft.A319]
//! name = "Airbus A319"
//! fuel_burn_litres_per_hour = 2300
//! cruise_speed_kmh = 830
//! crew_cost_per_hour = 480
//! operating_empty_weight_kg = 40800
//!
//! [cost.airports.TLS]
//! latitude = 43.6291
//! longitude = 1.3638
//! fee = 900
//!
//! [airlines]
//! XK = "Air Corsica"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::airlines::AirlineDirectory;
use crate::cost::{AircraftProfile, AircraftTable, AirportInfo, AirportTable, DEFAULT_AIRPORT_FEE};
use crate::error::FlightError;
use crate::fetch::{Credentials, FetchOptions, AMADEUS_TEST_URL, OPENCAGE_URL};

pub const DEFAULT_CONFIG_FILE: &str = "flypath.toml";
pub const ENV_PREFIX: &str = "FLYPATH_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Currency requested from the flight API and used for display.
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub amadeus: AmadeusConfig,

    #[serde(default)]
    pub geocode: GeocodeConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cost: CostConfig,

    /// Extra or corrected carrier names, code = name.
    #[serde(default)]
    pub airlines: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default = "default_amadeus_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// OpenCage key; airports missing from the table are geocoded when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_geocode_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,
    /// Per-target overrides, e.g. `flypath::fetch = "debug"`.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Fee charged per airport when the airport has no fee of its own.
    #[serde(default = "default_airport_fee")]
    pub default_airport_fee: f64,
    #[serde(default)]
    pub aircraft: BTreeMap<String, AircraftProfile>,
    #[serde(default)]
    pub airports: BTreeMap<String, AirportInfo>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_amadeus_url() -> String {
    AMADEUS_TEST_URL.to_string()
}

fn default_geocode_url() -> String {
    OPENCAGE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_airport_fee() -> f64 {
    DEFAULT_AIRPORT_FEE
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            base_url: default_amadeus_url(),
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocode_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            proxy: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            default_airport_fee: default_airport_fee(),
            aircraft: BTreeMap::new(),
            airports: BTreeMap::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            amadeus: AmadeusConfig::default(),
            geocode: GeocodeConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            cost: CostConfig::default(),
            airlines: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Loads `path`, or `./flypath.toml` when no path is given. A missing
    /// default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self, FlightError> {
        let file = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(FlightError::Config(format!(
                        "config file {} does not exist",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Self::figment(&file)
            .extract()
            .map_err(|e| FlightError::Config(e.to_string()))
    }

    fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            proxy: self.http.proxy.clone(),
            timeout: self.http.timeout,
        }
    }

    pub fn credentials(&self) -> Result<Credentials, FlightError> {
        let client_id = self
            .amadeus
            .client_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(FlightError::MissingCredentials("amadeus.client_id"))?;
        let client_secret = self
            .amadeus
            .client_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(FlightError::MissingCredentials("amadeus.client_secret"))?;
        Ok(Credentials {
            client_id,
            client_secret,
        })
    }

    pub fn airline_directory(&self) -> AirlineDirectory {
        AirlineDirectory::builtin().with_overrides(self.airlines.clone())
    }

    pub fn aircraft_table(&self) -> Result<AircraftTable, FlightError> {
        AircraftTable::builtin().with_overrides(self.cost.aircraft.clone())
    }

    pub fn airport_table(&self) -> AirportTable {
        AirportTable::builtin().with_overrides(self.cost.airports.clone())
    }
}

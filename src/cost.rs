use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FlightError;
use crate::model::{Coordinates, CostEstimate};

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Mass of one passenger with baggage.
pub const PASSENGER_MASS_KG: f64 = 100.0;

/// Fuel burn grows by this fraction per unit of weight factor above one,
/// where the weight factor is loaded weight over operating empty weight.
pub const LOAD_SENSITIVITY: f64 = 0.005;

pub const DEFAULT_AIRPORT_FEE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub name: String,
    pub fuel_burn_litres_per_hour: f64,
    pub cruise_speed_kmh: f64,
    pub crew_cost_per_hour: f64,
    pub operating_empty_weight_kg: f64,
}

impl AircraftProfile {
    fn new(
        name: &str,
        fuel_burn_litres_per_hour: f64,
        cruise_speed_kmh: f64,
        crew_cost_per_hour: f64,
        operating_empty_weight_kg: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            fuel_burn_litres_per_hour,
            cruise_speed_kmh,
            crew_cost_per_hour,
            operating_empty_weight_kg,
        }
    }

    fn validate(&self, key: &str) -> Result<(), FlightError> {
        let fields = [
            ("fuel_burn_litres_per_hour", self.fuel_burn_litres_per_hour),
            ("cruise_speed_kmh", self.cruise_speed_kmh),
            ("crew_cost_per_hour", self.crew_cost_per_hour),
            ("operating_empty_weight_kg", self.operating_empty_weight_kg),
        ];
        for (field, value) in fields {
            let positive = value.is_finite() && value > 0.0;
            let non_negative_crew = field == "crew_cost_per_hour" && value == 0.0;
            if !positive && !non_negative_crew {
                return Err(FlightError::Config(format!(
                    "aircraft profile {key}: {field} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Closed set of aircraft performance profiles keyed by type code.
#[derive(Debug, Clone, Default)]
pub struct AircraftTable {
    profiles: BTreeMap<String, AircraftProfile>,
}

impl AircraftTable {
    pub fn builtin() -> Self {
        let profiles = [
            ("A220", AircraftProfile::new("Airbus A220-300", 2000.0, 830.0, 450.0, 37_081.0)),
            ("A320", AircraftProfile::new("Airbus A320neo", 2430.0, 840.0, 500.0, 44_300.0)),
            ("A321", AircraftProfile::new("Airbus A321neo", 2900.0, 840.0, 550.0, 50_100.0)),
            ("A330", AircraftProfile::new("Airbus A330-300", 7000.0, 870.0, 1100.0, 129_400.0)),
            ("A350", AircraftProfile::new("Airbus A350-900", 7400.0, 903.0, 1200.0, 142_400.0)),
            ("ATR72", AircraftProfile::new("ATR 72-600", 800.0, 510.0, 350.0, 13_311.0)),
            ("B737", AircraftProfile::new("Boeing 737-700", 2500.0, 850.0, 500.0, 41_413.0)),
            ("B738", AircraftProfile::new("Boeing 737-800", 2600.0, 850.0, 520.0, 41_413.0)),
            ("B777", AircraftProfile::new("Boeing 777-300ER", 9500.0, 905.0, 1300.0, 167_800.0)),
            ("B787", AircraftProfile::new("Boeing 787-9", 6500.0, 903.0, 1150.0, 128_850.0)),
            ("E190", AircraftProfile::new("Embraer E190", 1900.0, 830.0, 420.0, 28_080.0)),
        ];
        Self {
            profiles: profiles
                .into_iter()
                .map(|(key, profile)| (key.to_string(), profile))
                .collect(),
        }
    }

    pub fn from_profiles<I>(profiles: I) -> Result<Self, FlightError>
    where
        I: IntoIterator<Item = (String, AircraftProfile)>,
    {
        Self::default().with_overrides(profiles)
    }

    pub fn with_overrides<I>(mut self, profiles: I) -> Result<Self, FlightError>
    where
        I: IntoIterator<Item = (String, AircraftProfile)>,
    {
        for (key, profile) in profiles {
            let key = normalize_key(&key);
            profile.validate(&key)?;
            self.profiles.insert(key, profile);
        }
        Ok(self)
    }

    pub fn get(&self, aircraft_type: &str) -> Option<&AircraftProfile> {
        self.profiles.get(&normalize_key(aircraft_type))
    }

    /// Checks everything about `request` that needs no route data, in the
    /// order passengers, fuel price, aircraft type, and returns the profile.
    pub fn check_request(&self, request: &CostRequest) -> Result<&AircraftProfile, FlightError> {
        let pax = request.passenger_count;
        if pax == 0 {
            return Err(FlightError::InvalidPassengerCount(pax));
        }

        let fuel_price = request.fuel_price_per_litre;
        if !fuel_price.is_finite() || fuel_price <= 0.0 {
            return Err(FlightError::InvalidFuelPrice(fuel_price));
        }

        self.get(&request.aircraft_type)
            .ok_or_else(|| FlightError::UnknownAircraftType(request.aircraft_type.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AircraftProfile)> {
        self.profiles.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

/// Distance and airport-fee lookups used by [`CostModel`].
pub trait RouteData {
    fn distance_km(&self, from: &str, to: &str) -> Option<f64>;
    fn airport_fee(&self, code: &str) -> Option<f64>;
}

impl<T: RouteData + ?Sized> RouteData for &T {
    fn distance_km(&self, from: &str, to: &str) -> Option<f64> {
        (**self).distance_km(from, to)
    }

    fn airport_fee(&self, code: &str) -> Option<f64> {
        (**self).airport_fee(code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
}

impl AirportInfo {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Airport coordinates and landing/handling fees, keyed by IATA code.
#[derive(Debug, Clone, Default)]
pub struct AirportTable {
    airports: BTreeMap<String, AirportInfo>,
}

impl AirportTable {
    pub fn builtin() -> Self {
        let airports: &[(&str, f64, f64, Option<f64>)] = &[
            ("ALG", 36.6910, 3.2155, None),
            ("AMS", 52.3105, 4.7683, Some(1250.0)),
            ("ATL", 33.6407, -84.4277, None),
            ("BCN", 41.2974, 2.0833, None),
            ("BKK", 13.6900, 100.7501, None),
            ("CDG", 49.0097, 2.5479, Some(1450.0)),
            ("CMN", 33.3675, -7.5898, None),
            ("DOH", 25.2731, 51.6081, None),
            ("DXB", 25.2532, 55.3657, None),
            ("FCO", 41.8003, 12.2389, None),
            ("FRA", 50.0379, 8.5622, Some(1300.0)),
            ("GRU", -23.4356, -46.4731, None),
            ("HEL", 60.3172, 24.9633, None),
            ("HND", 35.5494, 139.7798, None),
            ("IST", 41.2753, 28.7519, None),
            ("JFK", 40.6413, -73.7781, Some(1800.0)),
            ("LAX", 33.9416, -118.4085, None),
            ("LGW", 51.1537, -0.1821, None),
            ("LHR", 51.4700, -0.4543, Some(2100.0)),
            ("LIS", 38.7742, -9.1342, None),
            ("LYS", 45.7256, 5.0811, None),
            ("MAD", 40.4983, -3.5676, None),
            ("MRS", 43.4393, 5.2214, None),
            ("MUC", 48.3537, 11.7750, None),
            ("NCE", 43.6584, 7.2159, None),
            ("NRT", 35.7720, 140.3929, None),
            ("ORD", 41.9742, -87.9073, None),
            ("ORY", 48.7262, 2.3652, Some(1200.0)),
            ("SIN", 1.3644, 103.9915, None),
            ("SYD", -33.9399, 151.1753, None),
            ("TUN", 36.8510, 10.2272, None),
            ("YUL", 45.4706, -73.7408, None),
            ("ZRH", 47.4582, 8.5555, None),
        ];
        Self {
            airports: airports
                .iter()
                .map(|&(code, latitude, longitude, fee)| {
                    (
                        code.to_string(),
                        AirportInfo {
                            latitude,
                            longitude,
                            fee,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn with_overrides<I>(mut self, airports: I) -> Self
    where
        I: IntoIterator<Item = (String, AirportInfo)>,
    {
        for (code, info) in airports {
            self.insert(&code, info);
        }
        self
    }

    pub fn insert(&mut self, code: &str, info: AirportInfo) {
        self.airports.insert(normalize_key(code), info);
    }

    pub fn get(&self, code: &str) -> Option<&AirportInfo> {
        self.airports.get(&normalize_key(code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn coordinates(&self, code: &str) -> Option<Coordinates> {
        self.get(code).map(AirportInfo::coordinates)
    }
}

impl RouteData for AirportTable {
    fn distance_km(&self, from: &str, to: &str) -> Option<f64> {
        let a = self.coordinates(from)?;
        let b = self.coordinates(to)?;
        Some(great_circle_km(a, b))
    }

    fn airport_fee(&self, code: &str) -> Option<f64> {
        self.get(code).and_then(|a| a.fee)
    }
}

/// Haversine distance on a spherical Earth.
pub fn great_circle_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone)]
pub struct CostRequest {
    pub aircraft_type: String,
    pub passenger_count: u32,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub fuel_price_per_litre: f64,
}

/// Back-of-envelope operating cost for one flight.
#[derive(Debug, Clone)]
pub struct CostModel<R> {
    aircraft: AircraftTable,
    route_data: R,
    default_airport_fee: f64,
}

impl<R: RouteData> CostModel<R> {
    pub fn new(aircraft: AircraftTable, route_data: R) -> Self {
        Self {
            aircraft,
            route_data,
            default_airport_fee: DEFAULT_AIRPORT_FEE,
        }
    }

    /// Negative fees are clamped to zero.
    pub fn with_default_airport_fee(mut self, fee: f64) -> Self {
        self.default_airport_fee = non_negative(fee);
        self
    }

    pub fn aircraft(&self) -> &AircraftTable {
        &self.aircraft
    }

    pub fn route_data(&self) -> &R {
        &self.route_data
    }

    pub fn estimate(&self, request: &CostRequest) -> Result<CostEstimate, FlightError> {
        let profile = self.aircraft.check_request(request)?;
        let pax = request.passenger_count;
        let fuel_price = request.fuel_price_per_litre;

        let from = normalize_key(&request.departure_airport);
        let to = normalize_key(&request.arrival_airport);

        let distance_km = self
            .route_data
            .distance_km(&from, &to)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| FlightError::MissingRouteData {
                from: from.clone(),
                to: to.clone(),
            })?;

        let duration_hours = distance_km / profile.cruise_speed_kmh;

        let oew = profile.operating_empty_weight_kg;
        let loaded_weight = oew + f64::from(pax) * PASSENGER_MASS_KG;
        let weight_factor = loaded_weight / oew;
        let fuel_burn_litres_per_hour =
            profile.fuel_burn_litres_per_hour * (1.0 + LOAD_SENSITIVITY * (weight_factor - 1.0));

        let fuel_litres = fuel_burn_litres_per_hour * duration_hours;
        let fuel_cost = fuel_litres * fuel_price;
        let crew_cost = profile.crew_cost_per_hour * duration_hours;

        let departure_fee = self.fee_for(&from);
        let arrival_fee = self.fee_for(&to);
        let airport_fees = departure_fee + arrival_fee;

        let total_cost = fuel_cost + crew_cost + airport_fees;
        let cost_per_passenger = total_cost / f64::from(pax);

        debug!(
            aircraft = %request.aircraft_type,
            %from,
            %to,
            distance_km,
            total_cost,
            "estimated flight cost"
        );

        Ok(CostEstimate {
            aircraft_type: request.aircraft_type.clone(),
            passenger_count: pax,
            departure_airport: from,
            arrival_airport: to,
            fuel_price_per_litre: fuel_price,
            distance_km,
            duration_hours,
            fuel_burn_litres_per_hour,
            fuel_litres,
            fuel_cost,
            crew_cost,
            departure_fee,
            arrival_fee,
            airport_fees,
            total_cost,
            cost_per_passenger,
        })
    }

    fn fee_for(&self, code: &str) -> f64 {
        match self.route_data.airport_fee(code) {
            Some(fee) if fee.is_finite() => non_negative(fee),
            _ => self.default_airport_fee,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

use std::collections::BTreeMap;

use flypath::cost::{
    AircraftProfile, AircraftTable, AirportTable, CostModel, CostRequest, RouteData,
    DEFAULT_AIRPORT_FEE,
};
use flypath::error::FlightError;

fn request(aircraft: &str, pax: u32, from: &str, to: &str, fuel: f64) -> CostRequest {
    CostRequest {
        aircraft_type: aircraft.into(),
        passenger_count: pax,
        departure_airport: from.into(),
        arrival_airport: to.into(),
        fuel_price_per_litre: fuel,
    }
}

fn builtin_model() -> CostModel<AirportTable> {
    CostModel::new(AircraftTable::builtin(), AirportTable::builtin())
}

/// Fixed distances and fees, independent of any coordinates.
struct FixedRoutes {
    distances: BTreeMap<(String, String), f64>,
    fees: BTreeMap<String, f64>,
}

impl FixedRoutes {
    fn new() -> Self {
        let mut distances = BTreeMap::new();
        distances.insert(("AAA".to_string(), "BBB".to_string()), 850.0);
        let mut fees = BTreeMap::new();
        fees.insert("AAA".to_string(), 200.0);
        fees.insert("BBB".to_string(), -50.0);
        Self { distances, fees }
    }
}

impl RouteData for FixedRoutes {
    fn distance_km(&self, from: &str, to: &str) -> Option<f64> {
        self.distances
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    fn airport_fee(&self, code: &str) -> Option<f64> {
        self.fees.get(code).copied()
    }
}

#[test]
fn cdg_to_alg_with_b737() {
    let est = builtin_model()
        .estimate(&request("B737", 150, "CDG", "ALG", 1.2))
        .unwrap();
    assert!((est.distance_km - 1370.84).abs() < 1.0, "{}", est.distance_km);
    assert!((est.duration_hours - est.distance_km / 850.0).abs() < 1e-9);
    assert!((est.fuel_burn_litres_per_hour - 2504.53).abs() < 0.01);
    assert_eq!(est.departure_fee, 1450.0);
    assert_eq!(est.arrival_fee, DEFAULT_AIRPORT_FEE);
    assert!((est.total_cost - 8103.42).abs() < 0.01, "{}", est.total_cost);
}

#[test]
fn cost_breakdown_sums_to_total() {
    let model = builtin_model();
    let cases = [
        ("A320", 1, "CDG", "LHR", 0.8),
        ("B787", 250, "JFK", "LAX", 1.1),
        ("ATR72", 70, "ORY", "NCE", 2.0),
        ("B777", 300, "DXB", "SYD", 0.95),
    ];
    for (aircraft, pax, from, to, fuel) in cases {
        let est = model.estimate(&request(aircraft, pax, from, to, fuel)).unwrap();
        let sum = est.fuel_cost + est.crew_cost + est.airport_fees;
        assert!((est.total_cost - sum).abs() < 1e-6, "{aircraft} {from}-{to}");
        assert!(
            (est.cost_per_passenger - est.total_cost / f64::from(pax)).abs() < 1e-9,
            "{aircraft} {from}-{to}"
        );
        assert!(est.distance_km >= 0.0);
        assert!(est.fuel_cost >= 0.0);
        assert!(est.crew_cost >= 0.0);
        assert!(est.airport_fees >= 0.0);
    }
}

#[test]
fn load_adjustment_is_small() {
    let model = builtin_model();
    let est = model.estimate(&request("B737", 150, "CDG", "ALG", 1.2)).unwrap();
    let weight_factor = (41_413.0 + 150.0 * 100.0) / 41_413.0;
    let expected = 2500.0 * (1.0 + 0.005 * (weight_factor - 1.0));
    assert!((est.fuel_burn_litres_per_hour - expected).abs() < 1e-9);
    assert!(est.fuel_burn_litres_per_hour < 2500.0 * 1.01);
}

#[test]
fn more_passengers_burn_more_fuel() {
    let model = builtin_model();
    let light = model.estimate(&request("A320", 10, "CDG", "ALG", 1.0)).unwrap();
    let heavy = model.estimate(&request("A320", 180, "CDG", "ALG", 1.0)).unwrap();
    assert!(heavy.fuel_burn_litres_per_hour > light.fuel_burn_litres_per_hour);
    assert!(heavy.fuel_cost > light.fuel_cost);
    assert!(heavy.cost_per_passenger < light.cost_per_passenger);
    assert_eq!(heavy.crew_cost, light.crew_cost);
}

#[test]
fn same_airport_costs_only_fees() {
    let est = builtin_model()
        .estimate(&request("B737", 100, "CDG", "CDG", 1.2))
        .unwrap();
    assert_eq!(est.distance_km, 0.0);
    assert_eq!(est.fuel_cost, 0.0);
    assert_eq!(est.crew_cost, 0.0);
    assert_eq!(est.total_cost, 2900.0);
}

#[test]
fn airport_codes_are_case_insensitive() {
    let lower = builtin_model()
        .estimate(&request("b737", 150, "cdg", "alg", 1.2))
        .unwrap();
    let upper = builtin_model()
        .estimate(&request("B737", 150, "CDG", "ALG", 1.2))
        .unwrap();
    assert_eq!(lower.total_cost, upper.total_cost);
    assert_eq!(lower.departure_airport, "CDG");
}

#[test]
fn custom_route_data() {
    let model = CostModel::new(AircraftTable::builtin(), FixedRoutes::new());
    let est = model.estimate(&request("B737", 150, "AAA", "BBB", 1.0)).unwrap();
    assert_eq!(est.distance_km, 850.0);
    assert!((est.duration_hours - 1.0).abs() < 1e-12);
    assert!((est.crew_cost - 500.0).abs() < 1e-9);
    assert_eq!(est.departure_fee, 200.0);
    assert_eq!(est.arrival_fee, 0.0);
}

#[test]
fn route_data_by_reference() {
    let routes = FixedRoutes::new();
    let model = CostModel::new(AircraftTable::builtin(), &routes);
    assert!(model.estimate(&request("A320", 100, "AAA", "BBB", 1.0)).is_ok());
}

#[test]
fn missing_route_is_reported() {
    let model = CostModel::new(AircraftTable::builtin(), FixedRoutes::new());
    let err = model
        .estimate(&request("B737", 150, "BBB", "AAA", 1.0))
        .unwrap_err();
    match err {
        FlightError::MissingRouteData { from, to } => {
            assert_eq!(from, "BBB");
            assert_eq!(to, "AAA");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = builtin_model()
        .estimate(&request("B737", 150, "CDG", "XXX", 1.0))
        .unwrap_err();
    assert!(matches!(err, FlightError::MissingRouteData { .. }));
}

#[test]
fn default_fee_can_be_changed() {
    let model = builtin_model().with_default_airport_fee(250.0);
    let est = model.estimate(&request("B737", 150, "CDG", "ALG", 1.2)).unwrap();
    assert_eq!(est.arrival_fee, 250.0);

    let model = builtin_model().with_default_airport_fee(-10.0);
    let est = model.estimate(&request("B737", 150, "CDG", "ALG", 1.2)).unwrap();
    assert_eq!(est.arrival_fee, 0.0);
}

#[test]
fn rejects_zero_passengers() {
    let err = builtin_model()
        .estimate(&request("B737", 0, "CDG", "ALG", 1.2))
        .unwrap_err();
    assert!(matches!(err, FlightError::InvalidPassengerCount(0)));
}

#[test]
fn rejects_bad_fuel_price() {
    for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = builtin_model()
            .estimate(&request("B737", 150, "CDG", "ALG", price))
            .unwrap_err();
        assert!(matches!(err, FlightError::InvalidFuelPrice(_)), "{price}");
    }
}

#[test]
fn rejects_unknown_aircraft() {
    let err = builtin_model()
        .estimate(&request("UNKNOWN_XYZ", 150, "CDG", "ALG", 1.2))
        .unwrap_err();
    assert!(matches!(err, FlightError::UnknownAircraftType(ref t) if t == "UNKNOWN_XYZ"));
}

#[test]
fn input_checks_come_before_lookups() {
    let model = builtin_model();
    let err = model
        .estimate(&request("UNKNOWN_XYZ", 0, "XXX", "YYY", -1.0))
        .unwrap_err();
    assert!(matches!(err, FlightError::InvalidPassengerCount(_)));

    let err = model
        .estimate(&request("UNKNOWN_XYZ", 10, "XXX", "YYY", -1.0))
        .unwrap_err();
    assert!(matches!(err, FlightError::InvalidFuelPrice(_)));

    let err = model
        .estimate(&request("UNKNOWN_XYZ", 10, "XXX", "YYY", 1.0))
        .unwrap_err();
    assert!(matches!(err, FlightError::UnknownAircraftType(_)));
}

#[test]
fn aircraft_overrides_replace_and_extend() {
    let table = AircraftTable::builtin()
        .with_overrides([(
            "q400".to_string(),
            AircraftProfile {
                name: "Dash 8 Q400".into(),
                fuel_burn_litres_per_hour: 1000.0,
                cruise_speed_kmh: 550.0,
                crew_cost_per_hour: 300.0,
                operating_empty_weight_kg: 17_185.0,
            },
        )])
        .unwrap();
    assert!(table.get("Q400").is_some());
    assert!(table.get("B737").is_some());
    assert_eq!(table.len(), AircraftTable::builtin().len() + 1);
}

#[test]
fn aircraft_overrides_are_validated() {
    let err = AircraftTable::builtin()
        .with_overrides([(
            "BAD".to_string(),
            AircraftProfile {
                name: "Broken".into(),
                fuel_burn_litres_per_hour: 1000.0,
                cruise_speed_kmh: 0.0,
                crew_cost_per_hour: 300.0,
                operating_empty_weight_kg: 17_185.0,
            },
        )])
        .unwrap_err();
    assert!(matches!(err, FlightError::Config(_)));
}

#[test]
fn request_checks_need_no_route_data() {
    let aircraft = AircraftTable::builtin();
    let profile = aircraft
        .check_request(&request("b737", 150, "NOWHERE", "ELSEWHERE", 1.2))
        .unwrap();
    assert_eq!(profile.cruise_speed_kmh, 850.0);

    assert!(matches!(
        aircraft.check_request(&request("UNKNOWN_XYZ", 0, "CDG", "ALG", -1.0)),
        Err(FlightError::InvalidPassengerCount(0))
    ));
    assert!(matches!(
        aircraft.check_request(&request("UNKNOWN_XYZ", 1, "CDG", "ALG", -1.0)),
        Err(FlightError::InvalidFuelPrice(_))
    ));
    assert!(matches!(
        aircraft.check_request(&request("UNKNOWN_XYZ", 1, "CDG", "ALG", 1.0)),
        Err(FlightError::UnknownAircraftType(_))
    ));
}

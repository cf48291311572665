use std::fs;

use flypath::config::Settings;
use flypath::cost::{CostModel, CostRequest};
use flypath::error::FlightError;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("flypath.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn defaults_without_file() {
    let settings = Settings::default();
    assert_eq!(settings.currency, "EUR");
    assert_eq!(settings.http.timeout, 30);
    assert_eq!(settings.logging.default, "warn");
    assert_eq!(settings.cost.default_airport_fee, 1000.0);
    assert!(settings.amadeus.base_url.starts_with("https://"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, FlightError::Config(_)));
}

#[test]
fn partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
currency = "USD"

[logging]
default = "info"
"#,
    );
    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.currency, "USD");
    assert_eq!(settings.logging.default, "info");
    assert_eq!(settings.cost.default_airport_fee, 1000.0);
    assert!(settings.airlines.is_empty());
}

#[test]
fn malformed_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "currency = [unterminated");
    assert!(matches!(
        Settings::load(Some(&path)),
        Err(FlightError::Config(_))
    ));
}

#[test]
fn table_overrides_feed_the_cost_model() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[cost]
default_airport_fee = 500

[cost.aircraft.A319]
name = "Airbus A319"
fuel_burn_litres_per_hour = 2300
cruise_speed_kmh = 830
crew_cost_per_hour = 480
operating_empty_weight_kg = 40800

[cost.airports.TLS]
latitude = 43.6291
longitude = 1.3638
fee = 900
"#,
    );
    let settings = Settings::load(Some(&path)).unwrap();
    let aircraft = settings.aircraft_table().unwrap();
    assert!(aircraft.get("A319").is_some());
    assert!(aircraft.get("B737").is_some());

    let airports = settings.airport_table();
    assert!(airports.contains("TLS"));
    assert!(airports.contains("CDG"));

    let model = CostModel::new(aircraft, airports)
        .with_default_airport_fee(settings.cost.default_airport_fee);
    let est = model
        .estimate(&CostRequest {
            aircraft_type: "A319".into(),
            passenger_count: 120,
            departure_airport: "TLS".into(),
            arrival_airport: "ALG".into(),
            fuel_price_per_litre: 1.0,
        })
        .unwrap();
    assert_eq!(est.departure_fee, 900.0);
    assert_eq!(est.arrival_fee, 500.0);
}

#[test]
fn invalid_aircraft_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[cost.aircraft.BAD]
name = "Broken"
fuel_burn_litres_per_hour = -1
cruise_speed_kmh = 830
crew_cost_per_hour = 480
operating_empty_weight_kg = 40800
"#,
    );
    let settings = Settings::load(Some(&path)).unwrap();
    assert!(matches!(
        settings.aircraft_table(),
        Err(FlightError::Config(_))
    ));
}

#[test]
fn airline_names_override_builtin() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[airlines]
XK = "Air Corsica"
AF = "Air France (config)"
"#,
    );
    let directory = Settings::load(Some(&path)).unwrap().airline_directory();
    assert_eq!(directory.resolve("XK"), "Air Corsica");
    assert_eq!(directory.resolve("AF"), "Air France (config)");
    assert_eq!(directory.resolve("AH"), "Air Algérie");
}

#[test]
fn credentials_must_be_present() {
    let mut settings = Settings::default();
    settings.amadeus.client_id = None;
    settings.amadeus.client_secret = None;
    assert!(matches!(
        settings.credentials(),
        Err(FlightError::MissingCredentials("amadeus.client_id"))
    ));

    settings.amadeus.client_id = Some("id".into());
    settings.amadeus.client_secret = Some(String::new());
    assert!(matches!(
        settings.credentials(),
        Err(FlightError::MissingCredentials("amadeus.client_secret"))
    ));

    settings.amadeus.client_secret = Some("secret".into());
    let creds = settings.credentials().unwrap();
    assert_eq!(creds.client_id, "id");
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[http]
timeout = 10
"#,
    );
    std::env::set_var("FLYPATH_HTTP__TIMEOUT", "77");
    let settings = Settings::load(Some(&path));
    std::env::remove_var("FLYPATH_HTTP__TIMEOUT");

    let settings = settings.unwrap();
    assert_eq!(settings.http.timeout, 77);
    assert_eq!(settings.fetch_options().timeout, 77);
}

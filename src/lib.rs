pub mod airlines;
pub mod chart;
pub mod config;
pub mod cost;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod mcp;
pub mod model;
pub mod parse;
pub mod query;
pub mod stats;
pub mod table;

use config::Settings;
use cost::{AirportInfo, AirportTable};
use error::FlightError;
use fetch::AmadeusClient;
use model::SearchResult;
use query::SearchParams;

pub async fn search(
    client: &AmadeusClient,
    params: &SearchParams,
) -> Result<SearchResult, FlightError> {
    params.validate()?;
    let payload = client.search_offers(params).await?;
    parse::parse_payload(&payload)
}

/// Geocodes airports missing from `table` when a geocode key is configured.
/// Airports the geocoder cannot place, including failed lookups, stay
/// missing so the cost model reports them as missing route data.
pub async fn fill_airports(table: &mut AirportTable, codes: &[&str], settings: &Settings) {
    let Some(ref api_key) = settings.geocode.api_key else {
        return;
    };
    let options = settings.fetch_options();

    for code in codes {
        if table.contains(code) {
            continue;
        }
        let found =
            fetch::fetch_airport_coordinates(&settings.geocode.base_url, api_key, code, &options)
                .await;
        match found {
            Ok(Some(c)) => table.insert(
                code,
                AirportInfo {
                    latitude: c.latitude,
                    longitude: c.longitude,
                    fee: None,
                },
            ),
            Ok(None) => tracing::warn!(%code, "geocoder returned no coordinates"),
            Err(e) => tracing::warn!(%code, error = %e, "airport geocoding failed"),
        }
    }
}

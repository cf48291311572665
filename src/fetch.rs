use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use wreq::{Client, Response};

use crate::error::{self, FlightError};
use crate::model::{Coordinates, FlightOffer};
use crate::parse;
use crate::query::SearchParams;

pub const AMADEUS_TEST_URL: &str = "https://test.api.amadeus.com";
pub const OPENCAGE_URL: &str = "https://api.opencagedata.com";

#[derive(Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

fn build_client(options: &FetchOptions) -> Result<Client, FlightError> {
    let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

    if let Some(ref proxy) = options.proxy {
        builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
    }

    builder.build().map_err(error::from_http_error)
}

fn check_status(response: &Response, endpoint: &str) -> Result<(), FlightError> {
    let status = response.status().as_u16();
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(FlightError::Unauthorized(status)),
        429 => Err(FlightError::RateLimited),
        _ => Err(FlightError::HttpStatus {
            status,
            endpoint: endpoint.to_string(),
        }),
    }
}

async fn read_json(response: Response) -> Result<Value, FlightError> {
    let body = response.text().await.map_err(error::from_http_error)?;
    serde_json::from_str(&body).map_err(|e| FlightError::Parse(e.to_string()))
}

/// Amadeus Self-Service client holding one client-credentials token.
pub struct AmadeusClient {
    http: Client,
    base_url: String,
    token: String,
}

impl AmadeusClient {
    pub async fn connect(
        base_url: &str,
        credentials: &Credentials,
        options: &FetchOptions,
    ) -> Result<Self, FlightError> {
        let http = build_client(options)?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let endpoint = format!("{base_url}/v1/security/oauth2/token");

        debug!(%endpoint, "requesting access token");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];
        let response = http
            .post(&endpoint)
            .form(&form)
            .send()
            .await
            .map_err(error::from_http_error)?;
        check_status(&response, "token endpoint")?;

        let token = parse::parse_access_token(&read_json(response).await?)?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub async fn search_offers(&self, params: &SearchParams) -> Result<Value, FlightError> {
        let endpoint = format!("{}/v2/shopping/flight-offers", self.base_url);
        debug!(
            origin = %params.origin,
            destination = %params.destination,
            date = %params.departure_date,
            "searching flight offers"
        );

        let response = self
            .http
            .get(&endpoint)
            .header("Authorization", self.bearer())
            .query(&params.to_url_params())
            .send()
            .await
            .map_err(error::from_http_error)?;
        check_status(&response, "flight-offers endpoint")?;

        read_json(response).await
    }

    /// Posts the original offer to the seat-map endpoint.
    pub async fn seat_map(&self, offer: &FlightOffer) -> Result<Value, FlightError> {
        let endpoint = format!("{}/v1/shopping/seatmaps", self.base_url);
        let body = serde_json::json!({ "data": [offer.raw] });

        let response = self
            .http
            .post(&endpoint)
            .header("Authorization", self.bearer())
            .header("Content-Type", "application/vnd.amadeus+json")
            .body(body.to_string())
            .send()
            .await
            .map_err(error::from_http_error)?;
        check_status(&response, "seat-map endpoint")?;

        read_json(response).await
    }
}

/// Looks up airport coordinates through the OpenCage geocoder.
pub async fn fetch_airport_coordinates(
    base_url: &str,
    api_key: &str,
    iata_code: &str,
    options: &FetchOptions,
) -> Result<Option<Coordinates>, FlightError> {
    let http = build_client(options)?;
    let endpoint = format!("{}/geocode/v1/json", base_url.trim_end_matches('/'));
    let query = format!("{iata_code} airport");
    debug!(%iata_code, "geocoding airport");

    let response = http
        .get(&endpoint)
        .query(&[("q", query.as_str()), ("key", api_key), ("limit", "1")])
        .send()
        .await
        .map_err(error::from_http_error)?;
    check_status(&response, "geocode endpoint")?;

    Ok(parse::parse_geocode(&read_json(response).await?))
}

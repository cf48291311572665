use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FlightError;
use crate::model::*;
use crate::query::parse_iso_duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    meta: Option<RawMeta>,
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    dictionaries: Option<RawDictionaries>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawDictionaries {
    #[serde(default)]
    carriers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffer {
    id: String,
    #[serde(default)]
    number_of_bookable_seats: Option<u32>,
    itineraries: Vec<RawItinerary>,
    price: RawPrice,
    #[serde(default)]
    validating_airline_codes: Vec<String>,
    #[serde(default)]
    traveler_pricings: Vec<RawTravelerPricing>,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    duration: Option<String>,
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    id: String,
    departure: RawEndpoint,
    arrival: RawEndpoint,
    carrier_code: String,
    number: Option<String>,
    aircraft: Option<RawAircraft>,
    duration: Option<String>,
    #[serde(default)]
    number_of_stops: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEndpoint {
    iata_code: String,
    at: String,
}

#[derive(Debug, Deserialize)]
struct RawAircraft {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrice {
    currency: String,
    total: Option<String>,
    grand_total: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTravelerPricing {
    price: Option<RawTravelerPrice>,
    #[serde(default)]
    fare_details_by_segment: Vec<RawFareDetail>,
}

#[derive(Debug, Deserialize)]
struct RawTravelerPrice {
    total: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFareDetail {
    segment_id: String,
    cabin: Option<String>,
}

/// Accepts both naive local timestamps (`2025-03-26T10:05:00`) and
/// timestamps with an offset, keeping the local wall-clock reading.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

fn parse_amount(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

fn parse_segment(raw: RawSegment, cabins: &HashMap<String, String>) -> Option<Segment> {
    let departure = parse_timestamp(&raw.departure.at)?;
    let arrival = parse_timestamp(&raw.arrival.at)?;
    let duration_minutes = raw
        .duration
        .as_deref()
        .and_then(parse_iso_duration)
        .unwrap_or_else(|| (arrival - departure).num_minutes().max(0) as u32);
    let cabin = cabins.get(&raw.id).cloned();

    Some(Segment {
        id: raw.id,
        from_airport: raw.departure.iata_code,
        to_airport: raw.arrival.iata_code,
        departure,
        arrival,
        carrier_code: raw.carrier_code,
        flight_number: raw.number,
        aircraft: raw.aircraft.map(|a| a.code),
        duration_minutes,
        stops: raw.number_of_stops,
        cabin,
    })
}

fn parse_itinerary(raw: RawItinerary, cabins: &HashMap<String, String>) -> Option<Itinerary> {
    let segments: Vec<Segment> = raw
        .segments
        .into_iter()
        .map(|s| parse_segment(s, cabins))
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        return None;
    }

    let duration_minutes = raw
        .duration
        .as_deref()
        .and_then(parse_iso_duration)
        .unwrap_or_else(|| segments.iter().map(|s| s.duration_minutes).sum());

    Some(Itinerary {
        duration_minutes,
        segments,
    })
}

fn parse_offer(value: &Value) -> Option<FlightOffer> {
    let raw: RawOffer = match serde_json::from_value(value.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "skipping malformed flight offer");
            return None;
        }
    };

    let price = raw
        .price
        .grand_total
        .as_deref()
        .or(raw.price.total.as_deref())
        .and_then(parse_amount)?;

    let carrier_code = raw
        .validating_airline_codes
        .first()
        .cloned()
        .or_else(|| {
            raw.itineraries
                .first()
                .and_then(|i| i.segments.first())
                .map(|s| s.carrier_code.clone())
        })?;

    let mut cabins: HashMap<String, String> = HashMap::new();
    let mut cabin_prices: BTreeMap<String, f64> = BTreeMap::new();
    for traveler in &raw.traveler_pricings {
        let traveler_price = traveler
            .price
            .as_ref()
            .and_then(|p| p.total.as_deref())
            .and_then(parse_amount);
        for fare in &traveler.fare_details_by_segment {
            let Some(ref cabin) = fare.cabin else { continue };
            cabins
                .entry(fare.segment_id.clone())
                .or_insert_with(|| cabin.clone());
            if let Some(p) = traveler_price {
                cabin_prices
                    .entry(cabin.clone())
                    .and_modify(|best| *best = best.min(p))
                    .or_insert(p);
            }
        }
    }

    let itineraries: Vec<Itinerary> = raw
        .itineraries
        .into_iter()
        .map(|i| parse_itinerary(i, &cabins))
        .collect::<Option<_>>()?;

    let first = itineraries.first()?.segments.first()?;
    let departure = first.departure;
    let cabin_class = first.cabin.clone();
    let duration_minutes = itineraries.iter().map(|i| i.duration_minutes).sum();

    Some(FlightOffer {
        id: raw.id,
        carrier_code,
        price,
        currency: raw.price.currency,
        departure,
        duration_minutes,
        cabin_class,
        seats_available: raw.number_of_bookable_seats.unwrap_or(0),
        itineraries,
        cabin_prices,
        raw: value.clone(),
    })
}

pub fn parse_payload(payload: &Value) -> Result<SearchResult, FlightError> {
    if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
        let detail = errors
            .iter()
            .filter_map(|e| e.get("detail").or_else(|| e.get("title")))
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(FlightError::Parse(format!("API returned errors: {detail}")));
    }

    let raw: RawResponse = serde_json::from_value(payload.clone())
        .map_err(|e| FlightError::Parse(e.to_string()))?;

    let offers: Vec<FlightOffer> = raw.data.iter().filter_map(parse_offer).collect();
    if offers.len() < raw.data.len() {
        warn!(
            skipped = raw.data.len() - offers.len(),
            "some flight offers could not be parsed"
        );
    }
    debug!(offers = offers.len(), "parsed flight offers");

    let carriers = raw
        .dictionaries
        .map(|d| {
            d.carriers
                .into_iter()
                .map(|(code, name)| Carrier { code, name })
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchResult {
        offers,
        metadata: SearchMetadata {
            carriers,
            total_count: raw.meta.and_then(|m| m.count),
        },
    })
}

pub fn parse_json(body: &str) -> Result<SearchResult, FlightError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| FlightError::Parse(e.to_string()))?;
    parse_payload(&payload)
}

/// First result of an OpenCage geocoding response.
pub fn parse_geocode(payload: &Value) -> Option<Coordinates> {
    let geometry = payload.get("results")?.get(0)?.get("geometry")?;
    Some(Coordinates {
        latitude: geometry.get("lat")?.as_f64()?,
        longitude: geometry.get("lng")?.as_f64()?,
    })
}

/// Counts seats on the first seat map of a seat-map response. A seat is
/// available when any traveler pricing marks it `AVAILABLE`.
pub fn count_seats(payload: &Value) -> Option<SeatCount> {
    let seat_map = payload.get("data")?.get(0)?;
    let mut count = SeatCount {
        available: 0,
        total: 0,
    };

    let decks = seat_map.get("decks").and_then(Value::as_array);
    for deck in decks.into_iter().flatten() {
        let seats = deck.get("seats").and_then(Value::as_array);
        for seat in seats.into_iter().flatten() {
            count.total += 1;
            let available = seat
                .get("travelerPricing")
                .and_then(Value::as_array)
                .is_some_and(|pricings| {
                    pricings.iter().any(|p| {
                        p.get("seatAvailabilityStatus").and_then(Value::as_str)
                            == Some("AVAILABLE")
                    })
                });
            if available {
                count.available += 1;
            }
        }
    }

    Some(count)
}

pub fn parse_access_token(payload: &Value) -> Result<String, FlightError> {
    payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .ok_or_else(|| FlightError::Parse("token response has no access_token".into()))
}

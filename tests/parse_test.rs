use chrono::{Datelike, Timelike, Weekday};
use flypath::parse::{
    count_seats, parse_access_token, parse_geocode, parse_json, parse_payload, parse_timestamp,
};
use serde_json::json;

const OFFERS: &str = include_str!("fixtures/flight_offers.json");
const SEATMAP: &str = include_str!("fixtures/seatmap.json");

#[test]
fn parses_valid_offers_and_skips_malformed() {
    let result = parse_json(OFFERS).unwrap();
    assert_eq!(result.offers.len(), 3);
    assert_eq!(result.metadata.total_count, Some(4));
}

#[test]
fn offer_fields_come_from_first_segment_and_grand_total() {
    let result = parse_json(OFFERS).unwrap();
    let offer = &result.offers[0];
    assert_eq!(offer.id, "1");
    assert_eq!(offer.carrier_code, "AF");
    assert_eq!(offer.price, 182.45);
    assert_eq!(offer.currency, "EUR");
    assert_eq!(offer.departure.date().weekday(), Weekday::Thu);
    assert_eq!(offer.departure.hour(), 10);
    assert_eq!(offer.duration_minutes, 145);
    assert_eq!(offer.cabin_class.as_deref(), Some("ECONOMY"));
    assert_eq!(offer.seats_available, 9);
}

#[test]
fn connecting_offer_keeps_all_segments() {
    let result = parse_json(OFFERS).unwrap();
    let offer = &result.offers[2];
    let segments: Vec<_> = offer.segments().collect();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].from_airport, "CDG");
    assert_eq!(segments[0].to_airport, "MRS");
    assert_eq!(segments[1].carrier_code, "AH");
    assert_eq!(segments[1].aircraft.as_deref(), Some("738"));
    assert_eq!(segments[0].cabin.as_deref(), Some("BUSINESS"));
    assert_eq!(segments[1].cabin.as_deref(), Some("ECONOMY"));
    assert_eq!(offer.duration_minutes, 370);
    assert_eq!(offer.cabin_prices.get("BUSINESS"), Some(&410.10));
    assert_eq!(offer.cabin_prices.get("ECONOMY"), Some(&410.10));
}

#[test]
fn carrier_dictionary_becomes_metadata() {
    let result = parse_json(OFFERS).unwrap();
    let codes: Vec<&str> = result
        .metadata
        .carriers
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(codes, vec!["5O", "AF", "AH"]);
    assert_eq!(result.metadata.carriers[1].name, "AIR FRANCE");
}

#[test]
fn raw_offer_is_kept_for_seat_maps() {
    let result = parse_json(OFFERS).unwrap();
    assert_eq!(result.offers[0].raw["id"], "1");
}

#[test]
fn empty_data_is_not_an_error() {
    let result = parse_payload(&json!({ "meta": { "count": 0 }, "data": [] })).unwrap();
    assert!(result.offers.is_empty());
    assert!(result.metadata.carriers.is_empty());
}

#[test]
fn api_errors_are_reported() {
    let payload = json!({
        "errors": [{ "status": 400, "code": 477, "title": "INVALID FORMAT", "detail": "invalid date" }]
    });
    let err = parse_payload(&payload).unwrap_err();
    assert!(err.to_string().contains("invalid date"));
}

#[test]
fn invalid_json_is_a_parse_error() {
    assert!(parse_json("{not json").is_err());
}

#[test]
fn negative_price_offer_is_skipped() {
    let mut payload: serde_json::Value = serde_json::from_str(OFFERS).unwrap();
    payload["data"][0]["price"]["grandTotal"] = json!("-5.00");
    let result = parse_payload(&payload).unwrap();
    assert_eq!(result.offers.len(), 2);
    assert!(result.offers.iter().all(|o| o.id != "1"));
}

#[test]
fn timestamps_with_and_without_offset() {
    let naive = parse_timestamp("2026-03-26T23:30:00").unwrap();
    assert_eq!(naive.date().weekday(), Weekday::Thu);

    let short = parse_timestamp("2026-03-26T23:30").unwrap();
    assert_eq!(short, naive);

    let offset = parse_timestamp("2026-03-26T23:30:00+01:00").unwrap();
    assert_eq!(offset, naive);

    assert!(parse_timestamp("26/03/2026").is_none());
}

#[test]
fn seat_map_counts_available_and_total() {
    let payload: serde_json::Value = serde_json::from_str(SEATMAP).unwrap();
    let count = count_seats(&payload).unwrap();
    assert_eq!(count.total, 6);
    assert_eq!(count.available, 3);
}

#[test]
fn seat_map_without_data() {
    assert!(count_seats(&json!({ "errors": [] })).is_none());
}

#[test]
fn geocode_first_result() {
    let payload = json!({
        "results": [
            { "geometry": { "lat": 36.691, "lng": 3.2155 } },
            { "geometry": { "lat": 0.0, "lng": 0.0 } }
        ]
    });
    let c = parse_geocode(&payload).unwrap();
    assert_eq!(c.latitude, 36.691);
    assert_eq!(c.longitude, 3.2155);
}

#[test]
fn geocode_no_results() {
    assert!(parse_geocode(&json!({ "results": [] })).is_none());
}

#[test]
fn access_token_extracted() {
    let payload = json!({ "type": "amadeusOAuth2Token", "access_token": "abc123", "expires_in": 1799 });
    assert_eq!(parse_access_token(&payload).unwrap(), "abc123");
    assert!(parse_access_token(&json!({ "error": "invalid_client" })).is_err());
}

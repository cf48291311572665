use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub id: String,
    pub from_airport: String,
    pub to_airport: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub carrier_code: String,
    pub flight_number: Option<String>,
    pub aircraft: Option<String>,
    pub duration_minutes: u32,
    pub stops: u32,
    pub cabin: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub duration_minutes: u32,
    pub segments: Vec<Segment>,
}

/// One priced itinerary option returned by a flight-offers search.
#[derive(Debug, Clone, Serialize)]
pub struct FlightOffer {
    pub id: String,
    /// First validating airline.
    pub carrier_code: String,
    pub price: f64,
    pub currency: String,
    /// Departure of the first segment, local wall-clock time at the
    /// departure airport.
    pub departure: NaiveDateTime,
    pub duration_minutes: u32,
    pub cabin_class: Option<String>,
    pub seats_available: u32,
    pub itineraries: Vec<Itinerary>,
    /// Lowest traveler price seen for each cabin on this offer.
    pub cabin_prices: BTreeMap<String, f64>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl FlightOffer {
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.itineraries.iter().flat_map(|i| i.segments.iter())
    }

    pub fn first_itinerary(&self) -> Option<&Itinerary> {
        self.itineraries.first()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Carrier {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchMetadata {
    pub carriers: Vec<Carrier>,
    pub total_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    pub offers: Vec<FlightOffer>,
    pub metadata: SearchMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatCount {
    pub available: u32,
    pub total: u32,
}

/// Full cost breakdown for one simulated flight.
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimate {
    pub aircraft_type: String,
    pub passenger_count: u32,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub fuel_price_per_litre: f64,
    pub distance_km: f64,
    pub duration_hours: f64,
    pub fuel_burn_litres_per_hour: f64,
    pub fuel_litres: f64,
    pub fuel_cost: f64,
    pub crew_cost: f64,
    pub departure_fee: f64,
    pub arrival_fee: f64,
    pub airport_fees: f64,
    pub total_cost: f64,
    pub cost_per_passenger: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayStats {
    pub weekday: Weekday,
    pub stats: PriceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub overall: PriceStats,
    pub per_carrier: BTreeMap<String, PriceStats>,
    /// Monday first; weekdays without offers are omitted.
    pub per_weekday: Vec<WeekdayStats>,
}

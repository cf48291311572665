use chrono::{Datelike, NaiveDate};

use crate::error::FlightError;
use crate::model::FlightOffer;

pub const MAX_ADULTS: u32 = 9;
pub const MAX_RESULTS: u32 = 250;

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub adults: u32,
    pub max_results: u32,
    pub currency: String,
    pub non_stop: bool,
}

impl SearchParams {
    pub fn one_way(origin: &str, destination: &str, departure_date: &str) -> Self {
        Self {
            origin: origin.to_uppercase(),
            destination: destination.to_uppercase(),
            departure_date: departure_date.to_string(),
            return_date: None,
            adults: 1,
            max_results: 50,
            currency: "EUR".into(),
            non_stop: false,
        }
    }
}

fn validate_airport(code: &str) -> Result<(), FlightError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(FlightError::InvalidAirport(code.to_string()));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` calendar date from 2000 onwards.
fn parse_date(date: &str) -> Result<NaiveDate, FlightError> {
    let invalid = || FlightError::InvalidDate(date.to_string());
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
    if parsed.year() < 2000 || date.len() != 10 {
        return Err(invalid());
    }
    Ok(parsed)
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), FlightError> {
        validate_airport(&self.origin)?;
        validate_airport(&self.destination)?;

        if self.origin == self.destination {
            return Err(FlightError::Validation(format!(
                "origin and destination are both {}",
                self.origin
            )));
        }

        let departure = parse_date(&self.departure_date)?;
        if let Some(ref ret) = self.return_date {
            let back = parse_date(ret)?;
            if back < departure {
                return Err(FlightError::Validation(format!(
                    "return date {ret} is before departure date {}",
                    self.departure_date
                )));
            }
        }

        if self.adults == 0 {
            return Err(FlightError::Validation(
                "at least one adult passenger required".into(),
            ));
        }

        if self.adults > MAX_ADULTS {
            return Err(FlightError::Validation(format!(
                "adult passengers ({}) exceeds maximum of {MAX_ADULTS}",
                self.adults
            )));
        }

        if self.max_results == 0 || self.max_results > MAX_RESULTS {
            return Err(FlightError::Validation(format!(
                "max results must be between 1 and {MAX_RESULTS}, got {}",
                self.max_results
            )));
        }

        Ok(())
    }

    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("originLocationCode".to_string(), self.origin.clone()),
            ("destinationLocationCode".to_string(), self.destination.clone()),
            ("departureDate".to_string(), self.departure_date.clone()),
            ("adults".to_string(), self.adults.to_string()),
            ("max".to_string(), self.max_results.to_string()),
        ];

        if let Some(ref ret) = self.return_date {
            params.push(("returnDate".to_string(), ret.clone()));
        }
        if !self.currency.is_empty() {
            params.push(("currencyCode".to_string(), self.currency.clone()));
        }
        if self.non_stop {
            params.push(("nonStop".to_string(), "true".to_string()));
        }

        params
    }
}

/// Parses an ISO 8601 duration such as `PT2H30M` into minutes.
pub fn parse_iso_duration(s: &str) -> Option<u32> {
    let rest = s.strip_prefix('P')?;
    let (days_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };
    if days_part.is_empty() && time_part.is_empty() {
        return None;
    }

    let mut minutes = 0u32;

    if !days_part.is_empty() {
        let days: u32 = days_part.strip_suffix('D')?.parse().ok()?;
        minutes = minutes.checked_add(days.checked_mul(24 * 60)?)?;
    }

    let mut number = String::new();
    for c in time_part.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let value: u32 = number.parse().ok()?;
        number.clear();
        let add = match c {
            'H' => value.checked_mul(60)?,
            'M' => value,
            // Seconds are below display resolution.
            'S' => 0,
            _ => return None,
        };
        minutes = minutes.checked_add(add)?;
    }

    if !number.is_empty() {
        return None;
    }

    Some(minutes)
}

/// Client-side narrowing of already retrieved offers.
#[derive(Debug, Clone, Default)]
pub struct OfferFilter {
    /// Drop offers with any itinerary longer than this.
    pub max_duration_minutes: Option<u32>,
    /// Drop offers with more connections than this on any itinerary.
    pub max_stops: Option<u32>,
    /// Keep only these validating carriers.
    pub airlines: Option<Vec<String>>,
    /// Keep offers with at least one segment in this cabin.
    pub cabin_class: Option<String>,
}

impl OfferFilter {
    pub fn is_empty(&self) -> bool {
        self.max_duration_minutes.is_none()
            && self.max_stops.is_none()
            && self.airlines.is_none()
            && self.cabin_class.is_none()
    }

    pub fn matches(&self, offer: &FlightOffer) -> bool {
        if let Some(max) = self.max_duration_minutes {
            if offer.itineraries.iter().any(|i| i.duration_minutes > max) {
                return false;
            }
        }

        if let Some(max) = self.max_stops {
            let too_many = offer.itineraries.iter().any(|i| {
                let connections = i.segments.len().saturating_sub(1) as u32;
                let technical: u32 = i.segments.iter().map(|s| s.stops).sum();
                connections + technical > max
            });
            if too_many {
                return false;
            }
        }

        if let Some(ref airlines) = self.airlines {
            if !airlines
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&offer.carrier_code))
            {
                return false;
            }
        }

        if let Some(ref cabin) = self.cabin_class {
            let has_cabin = offer
                .segments()
                .any(|s| s.cabin.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(cabin)));
            if !has_cabin {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, offers: &[FlightOffer]) -> Vec<FlightOffer> {
        offers.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

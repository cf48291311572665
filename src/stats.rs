use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};

use crate::error::FlightError;
use crate::model::{FlightOffer, PriceStats, StatisticsSummary, WeekdayStats};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value after sorting; the two middle values are averaged for
/// even-sized input. Duplicates are kept.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Summary figures for one bucket. The mean is clamped to `[min, max]`
/// since summing can round past the extremes (three 0.1 prices sum to
/// slightly more than 0.3).
pub fn price_stats(prices: &[f64]) -> Option<PriceStats> {
    let median = median(prices)?;
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = mean(prices)?.max(min).min(max);
    Some(PriceStats {
        count: prices.len(),
        total: prices.iter().sum(),
        mean,
        median,
        min,
        max,
    })
}

/// Weekday of the offer's first departure, in the departure airport's
/// local wall-clock time.
pub fn departure_weekday(offer: &FlightOffer) -> Weekday {
    offer.departure.weekday()
}

pub fn summarize(offers: &[FlightOffer]) -> Result<StatisticsSummary, FlightError> {
    let all: Vec<f64> = offers.iter().map(|o| o.price).collect();
    let overall = price_stats(&all).ok_or(FlightError::EmptyDataset)?;

    let mut by_carrier: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut by_weekday: [Vec<f64>; 7] = Default::default();

    for offer in offers {
        by_carrier
            .entry(offer.carrier_code.clone())
            .or_default()
            .push(offer.price);
        let day = departure_weekday(offer).num_days_from_monday() as usize;
        by_weekday[day].push(offer.price);
    }

    let per_carrier = by_carrier
        .into_iter()
        .filter_map(|(code, prices)| price_stats(&prices).map(|s| (code, s)))
        .collect();

    let per_weekday = WEEK
        .iter()
        .zip(by_weekday.iter())
        .filter_map(|(weekday, prices)| {
            price_stats(prices).map(|stats| WeekdayStats {
                weekday: *weekday,
                stats,
            })
        })
        .collect();

    Ok(StatisticsSummary {
        overall,
        per_carrier,
        per_weekday,
    })
}

pub fn average_price_by_carrier(offers: &[FlightOffer]) -> BTreeMap<String, f64> {
    let mut by_carrier: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for offer in offers {
        by_carrier
            .entry(offer.carrier_code.clone())
            .or_default()
            .push(offer.price);
    }
    by_carrier
        .into_iter()
        .filter_map(|(code, prices)| mean(&prices).map(|m| (code, m)))
        .collect()
}

/// The `n` cheapest offers, ties kept in their original order.
pub fn cheapest(offers: &[FlightOffer], n: usize) -> Vec<FlightOffer> {
    let mut sorted = offers.to_vec();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));
    sorted.truncate(n);
    sorted
}

pub fn compare_cabins(offers: &[FlightOffer]) -> Vec<BTreeMap<String, f64>> {
    offers.iter().map(|o| o.cabin_prices.clone()).collect()
}

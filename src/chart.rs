use std::fmt::Write;

use crate::airlines::AirlineDirectory;
use crate::model::{Coordinates, FlightOffer, StatisticsSummary};

const FULL: char = '█';
const PARTIALS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

pub const DEFAULT_WIDTH: usize = 40;

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let eighths = ((value / max).min(1.0) * width as f64 * 8.0).round() as usize;
    let mut s: String = std::iter::repeat_n(FULL, eighths / 8).collect();
    if eighths % 8 > 0 {
        s.push(PARTIALS[eighths % 8]);
    }
    s
}

/// Horizontal bars scaled so the largest value spans `width` cells.
pub fn bar_chart(title: &str, rows: &[(String, f64)], unit: &str, width: usize) -> String {
    let mut out = format!("{title}\n");
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    for (label, value) in rows {
        let _ = writeln!(
            out,
            "{label:>label_width$} │{:<width$} {value:.0}{unit}",
            bar(*value, max, width),
        );
    }
    out
}

/// Mean and median price per airline, one pair of bars per airline.
pub fn price_chart(
    summary: &StatisticsSummary,
    directory: &AirlineDirectory,
    currency: &str,
    width: usize,
) -> String {
    let mut out = format!("Mean and median flight prices by airline ({currency})\n");
    let labels: Vec<String> = summary
        .per_carrier
        .keys()
        .map(|code| directory.resolve(code).to_string())
        .collect();
    let label_width = labels
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once("median".len()))
        .max()
        .unwrap_or(0);
    let max = summary
        .per_carrier
        .values()
        .flat_map(|s| [s.mean, s.median])
        .fold(0.0, f64::max);

    for (label, stats) in labels.iter().zip(summary.per_carrier.values()) {
        let _ = writeln!(
            out,
            "{label:>label_width$} │{:<width$} mean {:.2}",
            bar(stats.mean, max, width),
            stats.mean
        );
        let _ = writeln!(
            out,
            "{:>label_width$} │{:<width$} median {:.2}",
            "",
            bar(stats.median, max, width),
            stats.median
        );
    }
    out
}

pub fn weekday_chart(summary: &StatisticsSummary, currency: &str, width: usize) -> String {
    let rows: Vec<(String, f64)> = summary
        .per_weekday
        .iter()
        .map(|d| (d.weekday.to_string(), d.stats.mean))
        .collect();
    bar_chart(
        &format!("Mean price by departure weekday ({currency})"),
        &rows,
        &format!(" {currency}"),
        width,
    )
}

/// Segment durations of one offer.
pub fn itinerary_chart(index: usize, offer: &FlightOffer, width: usize) -> String {
    let rows: Vec<(String, f64)> = offer
        .segments()
        .map(|s| {
            (
                format!("{} → {}", s.from_airport, s.to_airport),
                f64::from(s.duration_minutes),
            )
        })
        .collect();
    bar_chart(&format!("Itinerary {index}"), &rows, " min", width)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone Leaflet page with both airports and the direct line between them.
pub fn route_map_html(from: (&str, Coordinates), to: (&str, Coordinates)) -> String {
    let (from_code, a) = from;
    let (to_code, b) = to;
    let center_lat = (a.latitude + b.latitude) / 2.0;
    let center_lon = (a.longitude + b.longitude) / 2.0;
    let from_code = escape_html(from_code);
    let to_code = escape_html(to_code);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Route {from_code} → {to_code}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{center_lat}, {center_lon}], 4);
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
L.marker([{a_lat}, {a_lon}]).addTo(map).bindPopup('Departure: {from_code}');
L.marker([{b_lat}, {b_lon}]).addTo(map).bindPopup('Arrival: {to_code}');
L.polyline([[{a_lat}, {a_lon}], [{b_lat}, {b_lon}]], {{color: 'blue', weight: 2.5}}).addTo(map);
</script>
</body>
</html>
"#,
        a_lat = a.latitude,
        a_lon = a.longitude,
        b_lat = b.latitude,
        b_lon = b.longitude,
    )
}

use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

use crate::airlines::AirlineDirectory;
use crate::cost::AircraftTable;
use crate::model::{CostEstimate, FlightOffer, SeatCount, StatisticsSummary};

/// Which columns the offer table shows.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    /// Validating airline, resolved to its display name.
    pub show_airline: bool,
    /// Grand total price in the offer currency.
    pub show_price: bool,
    /// Cabin per segment (ECONOMY, BUSINESS, ...).
    pub show_cabin_class: bool,
    /// Bookable seats reported by the search, plus seat-map counts when
    /// they were fetched.
    pub show_seats: bool,
    /// Show at most this many offers, in the order given.
    pub limit: Option<usize>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_airline: true,
            show_price: true,
            show_cabin_class: true,
            show_seats: true,
            limit: None,
        }
    }
}

pub fn format_price(price: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${price:.2}"),
        "EUR" => format!("€{price:.2}"),
        "GBP" => format!("£{price:.2}"),
        "JPY" | "CNY" => format!("¥{price:.0}"),
        "KRW" => format!("₩{price:.0}"),
        "INR" => format!("₹{price:.2}"),
        "THB" => format!("฿{price:.2}"),
        _ => format!("{price:.2} {currency}"),
    }
}

pub fn format_duration(minutes: u32) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn right(s: String) -> Cell {
    Cell::new(s).set_alignment(CellAlignment::Right)
}

pub fn render_offers(
    offers: &[FlightOffer],
    directory: &AirlineDirectory,
    options: &DisplayOptions,
    seat_maps: &BTreeMap<String, SeatCount>,
) -> String {
    let mut header = vec!["#"];
    if options.show_airline {
        header.push("Airline");
    }
    header.extend(["Route", "Depart", "Arrive", "Duration", "Stops", "Aircraft"]);
    if options.show_cabin_class {
        header.push("Cabin");
    }
    if options.show_seats {
        header.push("Seats");
    }
    if options.show_price {
        header.push("Price");
    }
    let mut table = new_table(header);

    let limit = options.limit.unwrap_or(offers.len());
    for (idx, offer) in offers.iter().take(limit).enumerate() {
        let mut row: Vec<Cell> = vec![Cell::new(idx + 1)];

        if options.show_airline {
            row.push(Cell::new(format!(
                "{} ({})",
                directory.resolve(&offer.carrier_code),
                offer.carrier_code
            )));
        }

        let segments: Vec<_> = offer.segments().collect();
        let route = segments
            .iter()
            .map(|s| format!("{} → {}", s.from_airport, s.to_airport))
            .collect::<Vec<_>>()
            .join("\n");
        let depart = segments
            .iter()
            .map(|s| s.departure.format("%Y-%m-%d %H:%M").to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let arrive = segments
            .iter()
            .map(|s| s.arrival.format("%Y-%m-%d %H:%M").to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let stops = offer
            .itineraries
            .iter()
            .map(|i| match i.segments.len() {
                0 | 1 => "Nonstop".to_string(),
                n => {
                    let via: Vec<&str> = i.segments[..n - 1]
                        .iter()
                        .map(|s| s.to_airport.as_str())
                        .collect();
                    format!("{} ({})", n - 1, via.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let aircraft = segments
            .iter()
            .map(|s| s.aircraft.clone().unwrap_or_else(|| "—".into()))
            .collect::<Vec<_>>()
            .join("\n");

        row.extend([
            Cell::new(route),
            Cell::new(depart),
            Cell::new(arrive),
            Cell::new(format_duration(offer.duration_minutes)),
            Cell::new(stops),
            Cell::new(aircraft),
        ]);

        if options.show_cabin_class {
            let cabins = segments
                .iter()
                .map(|s| s.cabin.clone().unwrap_or_else(|| "Unknown".into()))
                .collect::<Vec<_>>()
                .join("\n");
            row.push(Cell::new(cabins));
        }

        if options.show_seats {
            let seats = match seat_maps.get(&offer.id) {
                Some(count) => format!(
                    "{} bookable\n{}/{} on seat map",
                    offer.seats_available, count.available, count.total
                ),
                None => format!("{} bookable", offer.seats_available),
            };
            row.push(Cell::new(seats));
        }

        if options.show_price {
            row.push(right(format_price(offer.price, &offer.currency)));
        }

        table.add_row(row);
    }

    table.to_string()
}

pub fn render_summary(
    summary: &StatisticsSummary,
    directory: &AirlineDirectory,
    currency: &str,
) -> String {
    let mut carriers = new_table(vec!["Airline", "Offers", "Mean", "Median", "Min", "Max"]);
    for (code, stats) in &summary.per_carrier {
        carriers.add_row(vec![
            Cell::new(format!("{} ({code})", directory.resolve(code))),
            right(stats.count.to_string()),
            right(format_price(stats.mean, currency)),
            right(format_price(stats.median, currency)),
            right(format_price(stats.min, currency)),
            right(format_price(stats.max, currency)),
        ]);
    }
    let overall = &summary.overall;
    carriers.add_row(vec![
        Cell::new("All airlines"),
        right(overall.count.to_string()),
        right(format_price(overall.mean, currency)),
        right(format_price(overall.median, currency)),
        right(format_price(overall.min, currency)),
        right(format_price(overall.max, currency)),
    ]);

    let mut weekdays = new_table(vec!["Weekday", "Offers", "Mean", "Median"]);
    for day in &summary.per_weekday {
        weekdays.add_row(vec![
            Cell::new(day.weekday.to_string()),
            right(day.stats.count.to_string()),
            right(format_price(day.stats.mean, currency)),
            right(format_price(day.stats.median, currency)),
        ]);
    }

    format!("{carriers}\n{weekdays}")
}

pub fn render_estimate(estimate: &CostEstimate, currency: &str) -> String {
    let mut table = new_table(vec!["Item", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Aircraft", estimate.aircraft_type.clone()),
        (
            "Route",
            format!("{} → {}", estimate.departure_airport, estimate.arrival_airport),
        ),
        ("Passengers", estimate.passenger_count.to_string()),
        ("Distance", format!("{:.0} km", estimate.distance_km)),
        ("Flight time", format!("{:.2} h", estimate.duration_hours)),
        (
            "Fuel burn",
            format!("{:.0} L/h", estimate.fuel_burn_litres_per_hour),
        ),
        ("Fuel needed", format!("{:.0} L", estimate.fuel_litres)),
        (
            "Fuel price",
            format!("{}/L", format_price(estimate.fuel_price_per_litre, currency)),
        ),
        ("Fuel cost", format_price(estimate.fuel_cost, currency)),
        ("Crew cost", format_price(estimate.crew_cost, currency)),
        (
            "Departure fee",
            format_price(estimate.departure_fee, currency),
        ),
        ("Arrival fee", format_price(estimate.arrival_fee, currency)),
        ("Total cost", format_price(estimate.total_cost, currency)),
        (
            "Cost per passenger",
            format_price(estimate.cost_per_passenger, currency),
        ),
    ];
    for (item, value) in rows {
        table.add_row(vec![Cell::new(item), right(value)]);
    }
    table.to_string()
}

pub fn render_cabins(offers: &[FlightOffer], directory: &AirlineDirectory) -> String {
    let mut table = new_table(vec!["#", "Airline", "Cabin", "Lowest price"]);
    for (idx, offer) in offers.iter().enumerate() {
        if offer.cabin_prices.is_empty() {
            table.add_row(vec![
                Cell::new(idx + 1),
                Cell::new(directory.resolve(&offer.carrier_code)),
                Cell::new("—"),
                right("—".into()),
            ]);
            continue;
        }
        for (cabin, price) in &offer.cabin_prices {
            table.add_row(vec![
                Cell::new(idx + 1),
                Cell::new(directory.resolve(&offer.carrier_code)),
                Cell::new(cabin),
                right(format_price(*price, &offer.currency)),
            ]);
        }
    }
    table.to_string()
}

pub fn render_aircraft(aircraft: &AircraftTable) -> String {
    let mut table = new_table(vec![
        "Type",
        "Name",
        "Fuel burn (L/h)",
        "Cruise (km/h)",
        "Crew (/h)",
        "Empty weight (kg)",
    ]);
    for (key, profile) in aircraft.iter() {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(&profile.name),
            right(format!("{:.0}", profile.fuel_burn_litres_per_hour)),
            right(format!("{:.0}", profile.cruise_speed_kmh)),
            right(format!("{:.0}", profile.crew_cost_per_hour)),
            right(format!("{:.0}", profile.operating_empty_weight_kg)),
        ]);
    }
    table.to_string()
}

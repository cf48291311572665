use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::warn;

use flypath::airlines::{split_codes, AirlineDirectory};
use flypath::chart;
use flypath::config::Settings;
use flypath::cost::{CostModel, CostRequest};
use flypath::error::FlightError;
use flypath::fetch::AmadeusClient;
use flypath::model::{FlightOffer, SeatCount};
use flypath::query::{OfferFilter, SearchParams};
use flypath::stats;
use flypath::table::{self, DisplayOptions};

#[derive(Parser)]
#[command(
    name = "flypath",
    about = "Flight offer analytics and route cost estimates from the terminal",
    version,
    after_help = "\
Examples:
  flypath search -f CDG -t ALG -d 2026-03-26
  flypath search -f CDG -t ALG -d 2026-03-26 --stats --weekday
  flypath search -f CDG -t ALG -d 2026-03-26 --airlines AF,5O --max-stops 1
  flypath estimate --aircraft B737 --passengers 150 -f CDG -t ALG --fuel-price 1.2
  flypath airline AF 5O"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file (default: ./flypath.toml)"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search flight offers and analyse prices",
        long_about = "Search flight offers between two airports on a date.\n\
            Requires Amadeus credentials in the config file or FLYPATH_AMADEUS__CLIENT_ID / \
            FLYPATH_AMADEUS__CLIENT_SECRET.",
        after_help = "\
Examples:
  One-way:      flypath search -f CDG -t ALG -d 2026-03-26
  Round-trip:   flypath search -f CDG -t ALG -d 2026-03-26 --return-date 2026-04-02
  Cheapest 10:  flypath search -f CDG -t ALG -d 2026-03-26 --top 10
  Statistics:   flypath search -f CDG -t ALG -d 2026-03-26 --stats --weekday
  Filtered:     flypath search -f CDG -t ALG -d 2026-03-26 --airlines AF,5O --max-stops 1
  Route map:    flypath search -f CDG -t ALG -d 2026-03-26 --map
  JSON output:  flypath search -f CDG -t ALG -d 2026-03-26 --json --pretty"
    )]
    Search(SearchArgs),

    #[command(
        about = "Estimate the operating cost of one flight",
        after_help = "\
Example:
  flypath estimate --aircraft B737 --passengers 150 -f CDG -t ALG --fuel-price 1.2"
    )]
    Estimate(EstimateArgs),

    #[command(about = "Resolve airline codes to names")]
    Airline {
        #[arg(value_name = "CODE", required = true, help = "Carrier codes (e.g. AF 5O)")]
        codes: Vec<String>,
    },

    #[command(about = "List known aircraft performance profiles")]
    Aircraft,

    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(short, long, value_name = "IATA", help = "Departure airport code")]
    from: String,

    #[arg(short, long, value_name = "IATA", help = "Arrival airport code")]
    to: String,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Departure date")]
    date: String,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Return date (round-trip)")]
    return_date: Option<String>,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of adult passengers")]
    adults: u32,

    #[arg(
        long,
        default_value = "50",
        value_name = "N",
        help = "Maximum offers requested from the API"
    )]
    max_results: u32,

    #[arg(long, value_name = "CODE", help = "Currency code (default: from config, EUR)")]
    currency: Option<String>,

    #[arg(long, help = "Ask the API for nonstop flights only")]
    non_stop: bool,

    #[arg(long, value_name = "N", help = "Keep offers with at most N connections")]
    max_stops: Option<u32>,

    #[arg(long, value_name = "MINUTES", help = "Keep itineraries no longer than this")]
    max_duration: Option<u32>,

    #[arg(
        long,
        value_name = "AF,5O,...",
        help = "Keep only these airlines (comma-separated IATA codes)"
    )]
    airlines: Option<String>,

    #[arg(
        long,
        value_name = "CABIN",
        help = "Keep offers with this cabin [ECONOMY, PREMIUM_ECONOMY, BUSINESS, FIRST]"
    )]
    cabin: Option<String>,

    #[arg(long, value_name = "N", help = "Show only the N cheapest offers")]
    top: Option<usize>,

    #[arg(long, value_name = "N", help = "Show at most N offers, in API order")]
    limit: Option<usize>,

    #[arg(long, help = "Hide the airline column")]
    no_airline: bool,

    #[arg(long, help = "Hide the price column")]
    no_price: bool,

    #[arg(long, help = "Hide the cabin column")]
    no_cabin: bool,

    #[arg(long, help = "Hide the seats column")]
    no_seats: bool,

    #[arg(long, help = "Fetch seat maps and count available seats (one request per offer)")]
    seat_map: bool,

    #[arg(long, help = "Price statistics and chart by airline")]
    stats: bool,

    #[arg(long, help = "Mean price by departure weekday")]
    weekday: bool,

    #[arg(long, help = "Lowest price per cabin for each offer")]
    cabins: bool,

    #[arg(long, help = "Segment durations chart for each offer")]
    itineraries: bool,

    #[arg(long, help = "Write a route map of the first offer and open it")]
    map: bool,

    #[arg(
        long,
        default_value = "flight_route.html",
        value_name = "PATH",
        help = "Where --map writes the HTML file"
    )]
    map_file: PathBuf,

    #[arg(long, help = "Write the map without opening a browser")]
    no_open: bool,

    #[arg(long, help = "One-line-per-offer output")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(long, value_name = "SECS", help = "Request timeout (default: from config, 30)")]
    timeout: Option<u64>,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,
}

#[derive(clap::Args)]
struct EstimateArgs {
    #[arg(long, value_name = "TYPE", help = "Aircraft type (see `flypath aircraft`)")]
    aircraft: String,

    #[arg(long, value_name = "N", help = "Passengers on board")]
    passengers: u32,

    #[arg(short, long, value_name = "IATA", help = "Departure airport code")]
    from: String,

    #[arg(short, long, value_name = "IATA", help = "Arrival airport code")]
    to: String,

    #[arg(long, value_name = "PRICE", help = "Jet fuel price per litre")]
    fuel_price: f64,

    #[arg(long, help = "Output as JSON")]
    json: bool,
}

fn error_code(err: &FlightError) -> i32 {
    match err {
        FlightError::InvalidAirport(_)
        | FlightError::InvalidDate(_)
        | FlightError::Validation(_)
        | FlightError::UnknownAircraftType(_)
        | FlightError::MissingRouteData { .. }
        | FlightError::InvalidPassengerCount(_)
        | FlightError::InvalidFuelPrice(_)
        | FlightError::EmptyDataset => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_) => 3,
        FlightError::RateLimited | FlightError::Unauthorized(_) => 4,
        FlightError::HttpStatus { .. } => 5,
        FlightError::Parse(_) => 6,
        FlightError::Config(_) | FlightError::MissingCredentials(_) | FlightError::Io(_) => 7,
    }
}

fn error_kind(err: &FlightError) -> &'static str {
    match err {
        FlightError::InvalidAirport(_) => "invalid_airport",
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Validation(_) => "validation_error",
        FlightError::UnknownAircraftType(_) => "unknown_aircraft_type",
        FlightError::MissingRouteData { .. } => "missing_route_data",
        FlightError::InvalidPassengerCount(_) => "invalid_passenger_count",
        FlightError::InvalidFuelPrice(_) => "invalid_fuel_price",
        FlightError::EmptyDataset => "empty_dataset",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::RateLimited => "rate_limited",
        FlightError::Unauthorized(_) => "unauthorized",
        FlightError::HttpStatus { .. } => "http_error",
        FlightError::Parse(_) => "parse_error",
        FlightError::Config(_) => "config_error",
        FlightError::MissingCredentials(_) => "missing_credentials",
        FlightError::Io(_) => "io_error",
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn print_json(value: &serde_json::Value, pretty: bool) {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match output {
        Ok(s) => println!("{s}"),
        Err(e) => die(&FlightError::Parse(e.to_string()), true),
    }
}

fn build_params(args: &SearchArgs, settings: &Settings) -> SearchParams {
    SearchParams {
        origin: args.from.to_uppercase(),
        destination: args.to.to_uppercase(),
        departure_date: args.date.clone(),
        return_date: args.return_date.clone(),
        adults: args.adults,
        max_results: args.max_results,
        currency: args
            .currency
            .clone()
            .unwrap_or_else(|| settings.currency.clone())
            .to_uppercase(),
        non_stop: args.non_stop,
    }
}

fn build_filter(args: &SearchArgs) -> OfferFilter {
    OfferFilter {
        max_duration_minutes: args.max_duration,
        max_stops: args.max_stops,
        airlines: args.airlines.as_deref().map(split_codes),
        cabin_class: args.cabin.as_ref().map(|c| c.to_uppercase()),
    }
}

fn display_options(args: &SearchArgs) -> DisplayOptions {
    DisplayOptions {
        show_airline: !args.no_airline,
        show_price: !args.no_price,
        show_cabin_class: !args.no_cabin,
        show_seats: !args.no_seats,
        limit: args.limit,
    }
}

fn print_compact(offers: &[FlightOffer], directory: &AirlineDirectory) {
    for offer in offers {
        let price = table::format_price(offer.price, &offer.currency);

        let route = offer
            .itineraries
            .iter()
            .map(|i| {
                std::iter::once(
                    i.segments
                        .first()
                        .map(|s| s.from_airport.as_str())
                        .unwrap_or("?"),
                )
                .chain(i.segments.iter().map(|s| s.to_airport.as_str()))
                .collect::<Vec<_>>()
                .join(">")
            })
            .collect::<Vec<_>>()
            .join(" / ");

        let duration = format!(
            "{}h{:02}m",
            offer.duration_minutes / 60,
            offer.duration_minutes % 60
        );

        let stops = match offer.first_itinerary().map(|i| i.segments.len()) {
            Some(n) if n > 1 => format!("{} stop", n - 1),
            _ => "nonstop".to_string(),
        };

        let airline = directory.resolve(&offer.carrier_code);
        let depart = offer.departure.format("%b%d %H:%M");

        println!("{price} | {route} | {duration} | {stops} | {airline} | {depart}");
    }
}

async fn fetch_seat_maps(
    client: &AmadeusClient,
    offers: &[FlightOffer],
) -> BTreeMap<String, SeatCount> {
    let mut counts = BTreeMap::new();
    for offer in offers {
        match client.seat_map(offer).await {
            Ok(payload) => match flypath::parse::count_seats(&payload) {
                Some(count) => {
                    counts.insert(offer.id.clone(), count);
                }
                None => warn!(offer = %offer.id, "seat map response had no seat map"),
            },
            Err(e) => warn!(offer = %offer.id, error = %e, "seat map not available"),
        }
    }
    counts
}

async fn write_route_map(
    offer: &FlightOffer,
    settings: &Settings,
    args: &SearchArgs,
) -> Result<(), FlightError> {
    let itinerary = offer
        .first_itinerary()
        .ok_or_else(|| FlightError::Validation("offer has no itinerary".into()))?;
    let (Some(first), Some(last)) = (itinerary.segments.first(), itinerary.segments.last()) else {
        return Err(FlightError::Validation("offer has no segments".into()));
    };
    let from = first.from_airport.as_str();
    let to = last.to_airport.as_str();

    let mut airports = settings.airport_table();
    flypath::fill_airports(&mut airports, &[from, to], settings).await;
    let (Some(a), Some(b)) = (airports.coordinates(from), airports.coordinates(to)) else {
        return Err(FlightError::MissingRouteData {
            from: from.to_string(),
            to: to.to_string(),
        });
    };

    std::fs::write(&args.map_file, chart::route_map_html((from, a), (to, b)))?;
    println!("Route map written to {}", args.map_file.display());

    if !args.no_open {
        if let Err(e) = open::that(&args.map_file) {
            warn!(error = %e, "failed to open browser");
        }
    }
    Ok(())
}

async fn run_search(args: SearchArgs, mut settings: Settings) {
    let json_mode = args.json || args.pretty;

    if let Some(timeout) = args.timeout {
        settings.http.timeout = timeout;
    }
    if args.proxy.is_some() {
        settings.http.proxy = args.proxy.clone();
    }

    let params = build_params(&args, &settings);
    if let Err(e) = params.validate() {
        die(&e, json_mode);
    }

    let credentials = match settings.credentials() {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let client = match AmadeusClient::connect(
        &settings.amadeus.base_url,
        &credentials,
        &settings.fetch_options(),
    )
    .await
    {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let result = match flypath::search(&client, &params).await {
        Ok(r) => r,
        Err(e) => die(&e, json_mode),
    };

    let directory = settings.airline_directory().with_missing(
        result
            .metadata
            .carriers
            .iter()
            .map(|c| (c.code.clone(), c.name.clone())),
    );

    let filter = build_filter(&args);
    let mut offers = if filter.is_empty() {
        result.offers
    } else {
        filter.apply(&result.offers)
    };
    if let Some(n) = args.top {
        offers = stats::cheapest(&offers, n);
    }

    let summary = stats::summarize(&offers);

    if json_mode {
        let summary_json = match &summary {
            Ok(s) => serde_json::to_value(s).unwrap_or(serde_json::Value::Null),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        let output = serde_json::json!({
            "offers": offers,
            "summary": summary_json,
        });
        print_json(&output, args.pretty);
        return;
    }

    if offers.is_empty() {
        println!("No flight options found.");
        return;
    }

    if args.compact {
        print_compact(&offers, &directory);
    } else {
        let options = display_options(&args);
        let seat_maps = if args.seat_map && options.show_seats {
            let shown = options.limit.unwrap_or(offers.len()).min(offers.len());
            fetch_seat_maps(&client, &offers[..shown]).await
        } else {
            BTreeMap::new()
        };
        println!(
            "{}",
            table::render_offers(&offers, &directory, &options, &seat_maps)
        );
    }

    if args.stats || args.weekday {
        match &summary {
            Ok(summary) => {
                if args.stats {
                    println!();
                    println!(
                        "{}",
                        table::render_summary(summary, &directory, &params.currency)
                    );
                    println!(
                        "{}",
                        chart::price_chart(
                            summary,
                            &directory,
                            &params.currency,
                            chart::DEFAULT_WIDTH
                        )
                    );
                }
                if args.weekday {
                    println!(
                        "{}",
                        chart::weekday_chart(summary, &params.currency, chart::DEFAULT_WIDTH)
                    );
                }
            }
            Err(e) => eprintln!("error: statistics unavailable: {e}"),
        }
    }

    if args.cabins {
        println!("{}", table::render_cabins(&offers, &directory));
    }

    if args.itineraries {
        for (idx, offer) in offers.iter().enumerate() {
            println!(
                "{}",
                chart::itinerary_chart(idx + 1, offer, chart::DEFAULT_WIDTH)
            );
        }
    }

    if args.map {
        if let Some(first) = offers.first() {
            if let Err(e) = write_route_map(first, &settings, &args).await {
                eprintln!("error: route map unavailable: {e}");
            }
        }
    }
}

async fn run_estimate(args: EstimateArgs, settings: Settings) {
    let json_mode = args.json;

    let aircraft = match settings.aircraft_table() {
        Ok(a) => a,
        Err(e) => die(&e, json_mode),
    };

    let request = CostRequest {
        aircraft_type: args.aircraft,
        passenger_count: args.passengers,
        departure_airport: args.from.to_uppercase(),
        arrival_airport: args.to.to_uppercase(),
        fuel_price_per_litre: args.fuel_price,
    };
    if let Err(e) = aircraft.check_request(&request) {
        die(&e, json_mode);
    }

    let mut airports = settings.airport_table();
    let codes = [
        request.departure_airport.as_str(),
        request.arrival_airport.as_str(),
    ];
    flypath::fill_airports(&mut airports, &codes, &settings).await;

    let model = CostModel::new(aircraft, airports)
        .with_default_airport_fee(settings.cost.default_airport_fee);

    match model.estimate(&request) {
        Ok(estimate) => {
            if json_mode {
                match serde_json::to_value(&estimate) {
                    Ok(v) => print_json(&v, false),
                    Err(e) => die(&FlightError::Parse(e.to_string()), json_mode),
                }
            } else {
                println!("{}", table::render_estimate(&estimate, &settings.currency));
            }
        }
        Err(e) => die(&e, json_mode),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => die(&e, false),
    };
    flypath::logging::init(&settings.logging);

    match cli.command {
        Commands::Search(args) => run_search(args, settings).await,
        Commands::Estimate(args) => run_estimate(args, settings).await,
        Commands::Airline { codes } => {
            let directory = settings.airline_directory();
            for code in codes.iter().flat_map(|c| split_codes(c)) {
                println!("{code}\t{}", directory.resolve(&code));
            }
        }
        Commands::Aircraft => match settings.aircraft_table() {
            Ok(aircraft) => println!("{}", table::render_aircraft(&aircraft)),
            Err(e) => die(&e, false),
        },
        Commands::Mcp => {
            if let Err(e) = flypath::mcp::run(settings).await {
                die(&e, false);
            }
        }
    }
}

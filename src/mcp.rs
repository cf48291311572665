use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;

use crate::airlines::{split_codes, AirlineDirectory};
use crate::config::Settings;
use crate::cost::{CostModel, CostRequest};
use crate::error::FlightError;
use crate::fetch::AmadeusClient;
use crate::query::{OfferFilter, SearchParams};
use crate::stats;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    #[schemars(
        description = "Departure airport IATA code, exactly 3 uppercase letters. Example: CDG, JFK"
    )]
    from: String,
    #[schemars(description = "Arrival airport IATA code. Example: ALG")]
    to: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format. Example: 2026-03-26")]
    date: String,
    #[schemars(description = "Return date in YYYY-MM-DD for round-trip")]
    return_date: Option<String>,
    #[schemars(description = "Adult passengers. Default: 1")]
    adults: Option<u32>,
    #[schemars(description = "Currency code. Examples: EUR, USD. Default: configured currency")]
    currency: Option<String>,
    #[schemars(description = "Maximum connections per itinerary. 0 = nonstop only")]
    max_stops: Option<u32>,
    #[schemars(description = "Maximum itinerary duration in minutes")]
    max_duration: Option<u32>,
    #[schemars(description = "Keep only these airlines, comma-separated IATA codes. Example: AF,5O")]
    airlines: Option<String>,
    #[schemars(description = "Keep offers with this cabin: ECONOMY, PREMIUM_ECONOMY, BUSINESS, FIRST")]
    cabin: Option<String>,
    #[schemars(description = "Return only the N cheapest offers")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct EstimateArgs {
    #[schemars(description = "Aircraft type code. Examples: B737, A320, B787")]
    aircraft: String,
    #[schemars(description = "Number of passengers on board, at least 1")]
    passengers: u32,
    #[schemars(description = "Departure airport IATA code")]
    from: String,
    #[schemars(description = "Arrival airport IATA code")]
    to: String,
    #[schemars(description = "Jet fuel price per litre, in the configured currency")]
    fuel_price: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ResolveArgs {
    #[schemars(description = "Carrier codes, comma-separated. Example: AF,5O,ZZ")]
    codes: String,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

fn json_result(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => tool_error(format!("failed to encode result: {e}")),
    }
}

fn build_params(args: &SearchArgs, default_currency: &str) -> SearchParams {
    let mut params = SearchParams::one_way(&args.from, &args.to, &args.date);
    params.return_date = args.return_date.clone();
    params.adults = args.adults.unwrap_or(1);
    params.currency = args
        .currency
        .clone()
        .unwrap_or_else(|| default_currency.to_string());
    params
}

fn build_filter(args: &SearchArgs) -> OfferFilter {
    OfferFilter {
        max_duration_minutes: args.max_duration,
        max_stops: args.max_stops,
        airlines: args.airlines.as_deref().map(split_codes),
        cabin_class: args.cabin.as_ref().map(|c| c.to_uppercase()),
    }
}

#[derive(Debug, Clone)]
struct FlypathMcp {
    tool_router: ToolRouter<Self>,
    settings: Settings,
    directory: AirlineDirectory,
}

impl FlypathMcp {
    async fn run_search(&self, args: &SearchArgs) -> Result<serde_json::Value, FlightError> {
        let params = build_params(args, &self.settings.currency);
        params.validate()?;

        let credentials = self.settings.credentials()?;
        let client = AmadeusClient::connect(
            &self.settings.amadeus.base_url,
            &credentials,
            &self.settings.fetch_options(),
        )
        .await?;
        let result = crate::search(&client, &params).await?;

        let directory = self.directory.clone().with_missing(
            result
                .metadata
                .carriers
                .iter()
                .map(|c| (c.code.clone(), c.name.clone())),
        );

        let mut offers = build_filter(args).apply(&result.offers);
        if let Some(n) = args.top {
            offers = stats::cheapest(&offers, n);
        }

        let summary = match stats::summarize(&offers) {
            Ok(s) => serde_json::to_value(s).unwrap_or(serde_json::Value::Null),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        let carriers: serde_json::Map<String, serde_json::Value> = offers
            .iter()
            .map(|o| {
                (
                    o.carrier_code.clone(),
                    serde_json::Value::from(directory.resolve(&o.carrier_code)),
                )
            })
            .collect();

        Ok(serde_json::json!({
            "offers": offers,
            "carriers": carriers,
            "summary": summary,
        }))
    }
}

#[tool_router]
impl FlypathMcp {
    fn new(settings: Settings) -> Self {
        let directory = settings.airline_directory();
        Self {
            tool_router: Self::tool_router(),
            settings,
            directory,
        }
    }

    #[tool(
        description = "Search flight offers and return them as JSON together with price statistics: overall, per airline (mean, median, min, max) and per departure weekday. Optional filters narrow the offers before statistics are computed."
    )]
    async fn flypath_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.run_search(&args).await {
            Ok(value) => json_result(&value),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(
        description = "Estimate the operating cost of one flight: fuel (load adjusted), crew and airport fees, total and per passenger. Returns the full cost breakdown as JSON."
    )]
    async fn flypath_estimate_cost(
        &self,
        Parameters(args): Parameters<EstimateArgs>,
    ) -> Result<CallToolResult, McpError> {
        let aircraft = match self.settings.aircraft_table() {
            Ok(a) => a,
            Err(e) => return tool_error(e.to_string()),
        };
        let request = CostRequest {
            aircraft_type: args.aircraft,
            passenger_count: args.passengers,
            departure_airport: args.from.to_uppercase(),
            arrival_airport: args.to.to_uppercase(),
            fuel_price_per_litre: args.fuel_price,
        };
        if let Err(e) = aircraft.check_request(&request) {
            return tool_error(e.to_string());
        }

        let mut airports = self.settings.airport_table();
        let codes = [
            request.departure_airport.as_str(),
            request.arrival_airport.as_str(),
        ];
        crate::fill_airports(&mut airports, &codes, &self.settings).await;

        let model = CostModel::new(aircraft, airports)
            .with_default_airport_fee(self.settings.cost.default_airport_fee);

        match model.estimate(&request) {
            Ok(estimate) => json_result(&estimate),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(
        description = "Resolve airline carrier codes to display names. Unknown codes are returned unchanged."
    )]
    async fn flypath_resolve_airline(
        &self,
        Parameters(args): Parameters<ResolveArgs>,
    ) -> Result<CallToolResult, McpError> {
        let lines: Vec<String> = split_codes(&args.codes)
            .iter()
            .map(|code| format!("{code}: {}", self.directory.resolve(code)))
            .collect();
        Ok(CallToolResult::success(vec![Content::text(
            lines.join("\n"),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for FlypathMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "flypath".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Airline route economics. flypath_search returns offers with price statistics; flypath_estimate_cost gives a per-flight cost breakdown; flypath_resolve_airline maps carrier codes to names.".into(),
            ),
        }
    }
}

pub async fn run(settings: Settings) -> Result<(), FlightError> {
    let service = FlypathMcp::new(settings)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| FlightError::Io(std::io::Error::other(e.to_string())))?;
    service
        .waiting()
        .await
        .map_err(|e| FlightError::Io(std::io::Error::other(e.to_string())))?;
    Ok(())
}

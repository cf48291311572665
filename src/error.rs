use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlightError {
    #[error(
        "request timed out — the flight API may be slow or unreachable. \
         Try increasing --timeout or check your connection"
    )]
    Timeout,

    #[error("connection failed — check your internet connection ({0})")]
    ConnectionFailed(String),

    #[error("DNS resolution failed for {0} — check your internet connection")]
    DnsResolution(String),

    #[error("proxy error — check your --proxy URL is correct ({0})")]
    ProxyError(String),

    #[error("TLS/SSL error — connection to the flight API failed ({0})")]
    TlsError(String),

    #[error(
        "rate limited by the flight API (HTTP 429) — wait a few minutes before retrying"
    )]
    RateLimited,

    #[error(
        "authentication rejected (HTTP {0}) — check amadeus.client_id and \
         amadeus.client_secret in your config"
    )]
    Unauthorized(u16),

    #[error("unexpected HTTP status {status} from {endpoint}")]
    HttpStatus { status: u16, endpoint: String },

    #[error("missing credentials: {0} is not set (config file or FLYPATH_ environment)")]
    MissingCredentials(&'static str),

    #[error(
        "failed to parse API response — {0}. \
         This may indicate a change in the flight API format"
    )]
    Parse(String),

    #[error(
        "invalid airport code \"{0}\" — must be exactly 3 letters (e.g. CDG, ALG, JFK)"
    )]
    InvalidAirport(String),

    #[error("invalid date \"{0}\" — must be YYYY-MM-DD format (e.g. 2026-03-01)")]
    InvalidDate(String),

    #[error("{0}")]
    Validation(String),

    #[error(
        "unknown aircraft type \"{0}\" — run `flypath aircraft` to list known profiles"
    )]
    UnknownAircraftType(String),

    #[error(
        "no route data for {from} → {to} — add the airport to [cost.airports] \
         or configure a geocode API key"
    )]
    MissingRouteData { from: String, to: String },

    #[error("invalid passenger count {0} — must be at least 1")]
    InvalidPassengerCount(u32),

    #[error("invalid fuel price {0} — must be a positive amount per litre")]
    InvalidFuelPrice(f64),

    #[error("cannot summarize an empty set of flight offers")]
    EmptyDataset,

    #[error("configuration error — {0}")]
    Config(String),

    #[error("i/o error — {0}")]
    Io(#[from] std::io::Error),
}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    FlightError::ConnectionFailed(msg)
}

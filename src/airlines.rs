use std::collections::BTreeMap;

const BUILTIN_AIRLINES: &[(&str, &str)] = &[
    ("5O", "ASL Airlines France"),
    ("6E", "IndiGo"),
    ("AA", "American Airlines"),
    ("AC", "Air Canada"),
    ("AD", "Azul Brazilian Airlines"),
    ("AF", "Air France"),
    ("AH", "Air Algérie"),
    ("AI", "Air India"),
    ("AR", "Aerolíneas Argentinas"),
    ("AS", "Alaska Airlines"),
    ("AT", "Royal Air Maroc"),
    ("AV", "Avianca"),
    ("AY", "Finnair"),
    ("AZ", "ITA Airways"),
    ("B6", "JetBlue Airways"),
    ("BA", "British Airways"),
    ("BJ", "Nouvelair"),
    ("BR", "EVA Air"),
    ("BT", "airBaltic"),
    ("CA", "Air China"),
    ("CI", "China Airlines"),
    ("CM", "Copa Airlines"),
    ("CX", "Cathay Pacific"),
    ("CZ", "China Southern Airlines"),
    ("DL", "Delta Air Lines"),
    ("DY", "Norwegian Air Shuttle"),
    ("EI", "Aer Lingus"),
    ("EK", "Emirates"),
    ("ET", "Ethiopian Airlines"),
    ("EW", "Eurowings"),
    ("EY", "Etihad Airways"),
    ("FR", "Ryanair"),
    ("GA", "Garuda Indonesia"),
    ("HV", "Transavia"),
    ("IB", "Iberia"),
    ("JL", "Japan Airlines"),
    ("KE", "Korean Air"),
    ("KL", "KLM Royal Dutch Airlines"),
    ("LH", "Lufthansa"),
    ("LO", "LOT Polish Airlines"),
    ("LX", "Swiss International Air Lines"),
    ("MH", "Malaysia Airlines"),
    ("MS", "EgyptAir"),
    ("NH", "All Nippon Airways"),
    ("NZ", "Air New Zealand"),
    ("OS", "Austrian Airlines"),
    ("PC", "Pegasus Airlines"),
    ("QF", "Qantas"),
    ("QR", "Qatar Airways"),
    ("SK", "Scandinavian Airlines"),
    ("SN", "Brussels Airlines"),
    ("SQ", "Singapore Airlines"),
    ("SS", "Corsair International"),
    ("SV", "Saudia"),
    ("TG", "Thai Airways"),
    ("TK", "Turkish Airlines"),
    ("TO", "Transavia France"),
    ("TP", "TAP Air Portugal"),
    ("TU", "Tunisair"),
    ("U2", "easyJet"),
    ("UA", "United Airlines"),
    ("UX", "Air Europa"),
    ("VF", "AJet"),
    ("VS", "Virgin Atlantic"),
    ("VY", "Vueling"),
    ("W6", "Wizz Air"),
    ("WN", "Southwest Airlines"),
    ("WS", "WestJet"),
    ("XK", "Air Corsica"),
];

/// Carrier code to display name lookup.
///
/// Unknown codes are a normal state (code tables are never complete), so
/// [`AirlineDirectory::resolve`] falls back to the code itself instead of
/// failing.
#[derive(Debug, Clone, Default)]
pub struct AirlineDirectory {
    names: BTreeMap<String, String>,
}

impl AirlineDirectory {
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_AIRLINES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string())),
        )
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let names = entries
            .into_iter()
            .map(|(code, name)| (code.trim().to_uppercase(), name))
            .collect();
        Self { names }
    }

    /// Layers extra names on top, replacing existing entries for the same code.
    pub fn with_overrides<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (code, name) in entries {
            self.names.insert(code.trim().to_uppercase(), name);
        }
        self
    }

    /// Adds names only for codes the directory does not know yet. Carrier
    /// dictionaries returned by the flight API go through here so built-in
    /// and configured names keep precedence.
    pub fn with_missing<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (code, name) in entries {
            self.names.entry(code.trim().to_uppercase()).or_insert(name);
        }
        self
    }

    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        let key = code.trim().to_uppercase();
        self.names.get(&key).map(String::as_str).unwrap_or(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.names.contains_key(&code.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// Splits a comma-separated list of carrier codes, uppercased, blanks dropped.
pub fn split_codes(s: &str) -> Vec<String> {
    s.split(',')
        .map(|a| a.trim().to_uppercase())
        .filter(|a| !a.is_empty())
        .collect()
}

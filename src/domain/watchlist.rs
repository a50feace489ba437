//! Named symbol lists and symbol-file parsing.
//!
//! Index tables are static; lookups are case-insensitive. Member order is
//! preserved, since the scanner reports symbols in input order before
//! sorting by score.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchlistError {
    #[error("unknown index: {name}")]
    UnknownIndex { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub symbol: &'static str,
    pub name: &'static str,
}

const fn m(symbol: &'static str, name: &'static str) -> Member {
    Member { symbol, name }
}

const WATCHLIST: &[Member] = &[
    m("7011.T", "Mitsubishi Heavy Industries"),
    m("7013.T", "IHI"),
    m("8306.T", "Mitsubishi UFJ Financial"),
    m("8750.T", "Dai-ichi Life"),
    m("6701.T", "NEC"),
];

const AUTOMOTIVE: &[Member] = &[
    m("7203.T", "Toyota Motor"),
    m("7267.T", "Honda Motor"),
    m("7201.T", "Nissan Motor"),
    m("6902.T", "Denso"),
];

const ELECTRONICS: &[Member] = &[
    m("6758.T", "Sony Group"),
    m("6861.T", "Keyence"),
    m("6954.T", "Fanuc"),
    m("6501.T", "Hitachi"),
    m("6594.T", "Nidec"),
];

const FINANCIALS: &[Member] = &[
    m("8306.T", "Mitsubishi UFJ Financial"),
    m("8316.T", "Sumitomo Mitsui Financial"),
    m("8411.T", "Mizuho Financial"),
];

const TRADING_HOUSES: &[Member] = &[
    m("8058.T", "Mitsubishi Corp"),
    m("8031.T", "Mitsui & Co"),
    m("8001.T", "Itochu"),
];

const TELECOM: &[Member] = &[
    m("9432.T", "NTT"),
    m("9433.T", "KDDI"),
    m("9434.T", "SoftBank Corp"),
];

const PHARMA: &[Member] = &[
    m("4502.T", "Takeda Pharmaceutical"),
    m("4503.T", "Astellas Pharma"),
    m("4519.T", "Chugai Pharmaceutical"),
];

const DEFENSE: &[Member] = &[
    m("7011.T", "Mitsubishi Heavy Industries"),
    m("7012.T", "Kawasaki Heavy Industries"),
    m("7013.T", "IHI"),
];

const SEMICONDUCTOR: &[Member] = &[
    m("8035.T", "Tokyo Electron"),
    m("6723.T", "Renesas Electronics"),
    m("6857.T", "Advantest"),
    m("4063.T", "Shin-Etsu Chemical"),
];

const CONSUMER: &[Member] = &[
    m("9983.T", "Fast Retailing"),
    m("4661.T", "Oriental Land"),
    m("7974.T", "Nintendo"),
    m("9984.T", "SoftBank Group"),
];

/// Sector tables concatenated; duplicates removed at resolve time.
const NIKKEI_SAMPLE: &[&[Member]] = &[
    AUTOMOTIVE,
    ELECTRONICS,
    FINANCIALS,
    TRADING_HOUSES,
    TELECOM,
    PHARMA,
    DEFENSE,
    SEMICONDUCTOR,
    CONSUMER,
];

const INDICES: &[(&str, &[&[Member]])] = &[
    ("watchlist", &[WATCHLIST]),
    ("nikkei_sample", NIKKEI_SAMPLE),
    ("automotive", &[AUTOMOTIVE]),
    ("electronics", &[ELECTRONICS]),
    ("financials", &[FINANCIALS]),
    ("trading_houses", &[TRADING_HOUSES]),
    ("telecom", &[TELECOM]),
    ("pharma", &[PHARMA]),
    ("defense", &[DEFENSE]),
    ("semiconductor", &[SEMICONDUCTOR]),
    ("consumer", &[CONSUMER]),
];

/// Known index names with their member counts, in table order.
pub fn list_indices() -> Vec<(&'static str, usize)> {
    INDICES
        .iter()
        .map(|(name, parts)| (*name, collect_members(parts).len()))
        .collect()
}

pub fn resolve_index(name: &str) -> Result<Vec<String>, WatchlistError> {
    let wanted = name.trim().to_lowercase();
    INDICES
        .iter()
        .find(|(n, _)| *n == wanted)
        .map(|(_, parts)| {
            collect_members(parts)
                .into_iter()
                .map(|m| m.symbol.to_string())
                .collect()
        })
        .ok_or_else(|| WatchlistError::UnknownIndex {
            name: name.to_string(),
        })
}

/// Company name for a symbol appearing in any index table.
pub fn lookup_name(symbol: &str) -> Option<&'static str> {
    INDICES
        .iter()
        .flat_map(|(_, parts)| parts.iter())
        .flat_map(|part| part.iter())
        .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
        .map(|m| m.name)
}

fn collect_members(parts: &[&[Member]]) -> Vec<Member> {
    let mut seen = HashSet::new();
    parts
        .iter()
        .flat_map(|part| part.iter().copied())
        .filter(|m| seen.insert(m.symbol))
        .collect()
}

/// Uppercases and appends `suffix` unless the symbol already carries it.
pub fn normalize_symbol(raw: &str, suffix: &str) -> String {
    let symbol = raw.trim().to_uppercase();
    let suffix = suffix.to_uppercase();
    if suffix.is_empty() || symbol.ends_with(&suffix) {
        symbol
    } else {
        format!("{}{}", symbol, suffix)
    }
}

/// One symbol per line: the first whitespace-separated token. Blank lines
/// and lines starting with `#` are skipped.
pub fn parse_symbol_file(content: &str, suffix: &str) -> Vec<String> {
    let symbols = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(|token| normalize_symbol(token, suffix))
        .collect();
    dedupe(symbols)
}

/// Drops repeated symbols, keeping first occurrences in order.
pub fn dedupe(symbols: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_case_insensitive() {
        let lower = resolve_index("defense").unwrap();
        let upper = resolve_index("DEFENSE").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, vec!["7011.T", "7012.T", "7013.T"]);
    }

    #[test]
    fn resolve_unknown_index() {
        let err = resolve_index("nikkei9999").unwrap_err();
        assert_eq!(
            err,
            WatchlistError::UnknownIndex {
                name: "nikkei9999".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown index: nikkei9999");
    }

    #[test]
    fn nikkei_sample_has_no_duplicates() {
        let symbols = resolve_index("nikkei_sample").unwrap();
        let unique: HashSet<_> = symbols.iter().collect();
        assert_eq!(unique.len(), symbols.len());
        // 7011.T and 7013.T appear once even though defense repeats them
        assert_eq!(symbols.iter().filter(|s| *s == "7013.T").count(), 1);
    }

    #[test]
    fn list_indices_reports_counts() {
        let indices = list_indices();
        assert_eq!(indices[0], ("watchlist", 5));
        assert!(indices.iter().any(|(name, count)| *name == "telecom" && *count == 3));
    }

    #[test]
    fn lookup_name_finds_member() {
        assert_eq!(lookup_name("7203.t"), Some("Toyota Motor"));
        assert_eq!(lookup_name("AAPL"), None);
    }

    #[test]
    fn normalize_appends_missing_suffix() {
        assert_eq!(normalize_symbol("7203", ".T"), "7203.T");
        assert_eq!(normalize_symbol("7203.t", ".T"), "7203.T");
        assert_eq!(normalize_symbol(" aapl ", ""), "AAPL");
    }

    #[test]
    fn parse_symbol_file_skips_comments_and_blanks() {
        let content = "# holdings\n7203 Toyota\n\n  6758.T  # sony\n# 9999\n7203\n";
        assert_eq!(parse_symbol_file(content, ".T"), vec!["7203.T", "6758.T"]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let input = vec!["B".to_string(), "A".to_string(), "B".to_string()];
        assert_eq!(dedupe(input), vec!["B", "A"]);
    }
}

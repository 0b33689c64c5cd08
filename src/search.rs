/// Search query extraction for known search engines
use url::Url;

/// Known search engines: a host fragment and the query parameter carrying
/// the search text. Matching is a plain substring test on the host.
pub const SEARCH_ENGINES: &[(&str, &str)] = &[
    ("google.com", "q"),
    ("bing.com", "q"),
    ("duckduckgo.com", "q"),
    ("yahoo.com", "p"),
];

/// Extract the user's search text from a search engine results URL
///
/// Algorithm:
/// 1. Parse the URL; anything unparseable yields `None`
/// 2. Find the first engine whose host fragment appears in the hostname
/// 3. Return the first value of that engine's query parameter, decoded
///    the way a browser's `URLSearchParams` decodes it
///
/// An empty parameter value counts as no query.
///
/// Examples:
/// - https://www.google.com/search?q=cats → cats
/// - https://search.yahoo.com/search?p=rust+lang → rust lang
/// - https://example.com/?q=cats → None
pub fn extract_search_query(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let param = SEARCH_ENGINES
        .iter()
        .find(|(engine, _)| host.contains(engine))
        .map(|(_, param)| *param)?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .filter(|query| !query.is_empty())
}

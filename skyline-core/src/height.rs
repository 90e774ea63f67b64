/// Parse a free-form OSM height or elevation value into metres.
///
/// Only the first whitespace-delimited token is read, and a single trailing
/// `m` is stripped from it. The remainder must parse as a decimal number;
/// anything else yields `0.0`. Other units are not converted, so `"100 ft"`
/// reads as `100.0`. Negative and non-finite values also collapse to `0.0`.
///
/// # Examples
/// ```
/// use skyline_core::parse_height;
///
/// assert_eq!(parse_height("45.5 m"), 45.5);
/// assert_eq!(parse_height("30m"), 30.0);
/// assert_eq!(parse_height("100 meters tall"), 100.0);
/// assert_eq!(parse_height("invalid"), 0.0);
/// ```
#[must_use]
pub fn parse_height(raw: &str) -> f64 {
    let Some(token) = raw.split_whitespace().next() else {
        return 0.0;
    };
    let number = token.strip_suffix('m').unwrap_or(token);
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(0.0)
}

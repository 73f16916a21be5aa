use serde::Deserialize;

/// Main configuration structure for Link-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "first-pass", default)]
    pub first_pass: FirstPassConfig,
    #[serde(rename = "second-pass")]
    pub second_pass: SecondPassConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Concurrent first-pass harvest configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FirstPassConfig {
    /// CSS selector matching the links to harvest from each seed page
    #[serde(default = "default_first_selector")]
    pub selector: String,

    /// Attribute read from each matched element
    #[serde(default = "default_first_attribute")]
    pub attribute: String,

    /// Maximum number of seed pages fetched at once (absent = unbounded)
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: Option<u32>,
}

impl Default for FirstPassConfig {
    fn default() -> Self {
        Self {
            selector: default_first_selector(),
            attribute: default_first_attribute(),
            max_concurrent_fetches: None,
        }
    }
}

/// Sequential, rate-limited second-pass configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecondPassConfig {
    /// Prefix joined verbatim onto harvested hrefs and extracted values
    #[serde(rename = "base-domain")]
    pub base_domain: String,

    /// CSS selector matching the elements carrying second-pass links
    #[serde(default = "default_second_selector")]
    pub selector: String,

    /// Attribute read from each matched element
    #[serde(default = "default_second_attribute")]
    pub attribute: String,

    /// Rate limiting strategy applied before each second-pass fetch
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitKind,

    /// Delay between second-pass fetches (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Append every second-pass result instead of keeping only the last one
    #[serde(default)]
    pub accumulate: bool,
}

/// Rate limiting strategy for the second pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitKind {
    /// Sleep the full delay before every fetch
    #[default]
    FixedDelay,
    /// At most one fetch per delay period, first one immediate
    TokenBucket,
    /// No delay at all
    None,
}

/// Seed source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the CSV file holding the seeds
    pub path: String,

    /// Zero-based column holding the seed identifiers
    #[serde(default)]
    pub column: usize,

    /// Whether the first row is a header
    #[serde(rename = "has-headers", default)]
    pub has_headers: bool,
}

/// Result sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file the final results are written to
    pub path: String,
}

fn default_first_selector() -> String {
    ".btn-default.btn-thongso".to_string()
}

fn default_first_attribute() -> String {
    "href".to_string()
}

fn default_second_selector() -> String {
    "div.btn.sort.sort-version-on-pc a".to_string()
}

fn default_second_attribute() -> String {
    "data-link-version".to_string()
}

fn default_delay_ms() -> u64 {
    30_000
}

use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Listing-Scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Pagination and pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing-index URL; page `p` lives at `{base-url}/{p}`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of result pages to walk
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum detail links taken from one result page
    #[serde(rename = "cap-per-page", default = "default_cap_per_page")]
    pub cap_per_page: usize,

    /// Extra attempts for a listing page before the run is aborted
    #[serde(rename = "page-retries", default)]
    pub page_retries: u32,

    /// Lower bound of the settle delay after navigation (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the settle delay after navigation (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// How long to wait for the listing-info control to become clickable
    #[serde(
        rename = "info-panel-timeout-ms",
        default = "default_info_panel_timeout_ms"
    )]
    pub info_panel_timeout_ms: u64,

    /// Pause after clicking the listing-info control
    #[serde(rename = "panel-settle-ms", default = "default_panel_settle_ms")]
    pub panel_settle_ms: u64,

    /// Records with fewer populated fields (identity excluded) are dropped
    #[serde(rename = "min-populated-fields", default)]
    pub min_populated_fields: usize,
}

impl CrawlerConfig {
    pub fn info_panel_timeout(&self) -> Duration {
        Duration::from_millis(self.info_panel_timeout_ms)
    }

    pub fn panel_settle(&self) -> Duration {
        Duration::from_millis(self.panel_settle_ms)
    }
}

/// Fixed capability profile handed to every renderer session
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "https-only", default)]
    pub https_only: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            https_only: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file, truncated at the start of every run
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

/// CSS selectors describing the target site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Anchor elements on a result page
    #[serde(rename = "listing-anchor")]
    pub listing_anchor: String,

    /// Card element an anchor must contain to count as a listing link
    #[serde(rename = "listing-card")]
    pub listing_card: String,

    pub price: String,

    /// One label/value pair on a detail page
    #[serde(rename = "detail-item")]
    pub detail_item: String,

    #[serde(rename = "detail-label")]
    pub detail_label: String,

    #[serde(rename = "detail-value")]
    pub detail_value: String,

    /// Container holding the boolean amenity labels
    #[serde(rename = "boolean-container")]
    pub boolean_container: String,

    /// Element kind of the listing-info control
    #[serde(rename = "info-tab")]
    pub info_tab: String,

    /// Text the listing-info control carries
    #[serde(rename = "info-tab-text")]
    pub info_tab_text: String,

    /// Sub-element of a date item holding the value (last one wins)
    #[serde(rename = "date-value")]
    pub date_value: String,
}

impl SelectorConfig {
    /// All CSS selectors with their config key, for validation
    pub fn css_selectors(&self) -> [(&'static str, &str); 9] {
        [
            ("listing-anchor", &self.listing_anchor),
            ("listing-card", &self.listing_card),
            ("price", &self.price),
            ("detail-item", &self.detail_item),
            ("detail-label", &self.detail_label),
            ("detail-value", &self.detail_value),
            ("boolean-container", &self.boolean_container),
            ("info-tab", &self.info_tab),
            ("date-value", &self.date_value),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_anchor: "a".to_string(),
            listing_card: "div._listingCard__PoR_B".to_string(),
            price: "._price__EH7rC".to_string(),
            detail_item: "._item___4Sv8".to_string(),
            detail_label: "._label___qjLO".to_string(),
            detail_value: "._value__yF2Fx".to_string(),
            boolean_container: "._newSpecCard__hWWBI._boolean__waHdB".to_string(),
            info_tab: "div".to_string(),
            info_tab_text: "معلومات الإعلان".to_string(),
            date_value: "span".to_string(),
        }
    }
}

fn default_max_pages() -> u32 {
    200
}

fn default_cap_per_page() -> usize {
    10
}

fn default_min_delay_ms() -> u64 {
    5_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_info_panel_timeout_ms() -> u64 {
    10_000
}

fn default_panel_settle_ms() -> u64 {
    2_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

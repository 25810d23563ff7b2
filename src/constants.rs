/// Source name constants to ensure consistency across the codebase
/// These constants define the names used on the CLI and in run summaries

// Source names (used in CLI)
pub const FEED_SOURCE: &str = "feed";
pub const CONCERT_PAGE_SOURCE: &str = "concert_page";

/// Venue value recorded when no bracketed venue token is present.
/// A real value, not an extraction failure.
pub const VENUE_UNDECIDED: &str = "会場未定";

/// Hosts of known ticket vendors. A link counts as a ticket link when its
/// host is one of these or a subdomain of one.
pub const TICKET_VENDOR_HOSTS: &[&str] = &[
    "t.pia.jp",
    "w.pia.jp",
    "eplus.jp",
    "l-tike.com",
    "cnplayguide.com",
];

// Selectors shared between summary extraction and detail resolution
pub const TITLE_MARKER_SELECTOR: &str = ".title";
pub const EXTERNAL_LINK_SELECTOR: &str = "a[target=\"_blank\"]";
pub const LISTING_ROW_SELECTOR: &str = "#concertlist li";
pub const DETAIL_CONTENT_SELECTOR: &str = "#left";
pub const PURCHASE_LINK_SELECTOR: &str = "p.next a, a.next";

/// Link text marking a ticket-purchase link on detail pages.
pub const PURCHASE_LINK_TEXT: &str = "チケット購入";

/// Get all supported source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![FEED_SOURCE, CONCERT_PAGE_SOURCE]
}

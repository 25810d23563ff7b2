pub mod listing;
pub mod rss;

pub use listing::ListingSource;
pub use rss::FeedSource;

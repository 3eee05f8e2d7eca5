// Core algorithm exports
pub mod distance;
pub mod feed;
pub mod filters;
pub mod ranker;

pub use distance::{format_distance, haversine_distance};
pub use feed::{merge_feed, MergedFeed};
pub use filters::{filter_by_category, Categorized};
pub use ranker::{rank_by_distance, Located, Ranked, Ranking};

// Service exports
pub mod feed;
pub mod session;
pub mod supabase;

pub use feed::{FeedError, FeedService};
pub use session::{Claims, Session, SessionError, SessionVerifier};
pub use supabase::{with_cancel, NewLocation, SupabaseClient, SupabaseError};

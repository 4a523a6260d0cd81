pub mod account;
pub mod account_tag;
pub mod account_zone;
pub mod session;
pub mod study;
pub mod study_manager;
pub mod study_member;
pub mod study_tag;
pub mod study_zone;
pub mod tag;
pub mod zone;

pub use account::Entity as Account;
pub use session::Entity as Session;
pub use study::Entity as Study;
pub use tag::Entity as Tag;
pub use zone::Entity as Zone;

/// Minimum number of seconds between two confirmation emails, and between two
/// recruiting toggles of the same study.
pub const COOLDOWN_SECS: i64 = 60 * 60;

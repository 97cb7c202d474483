mod common;
pub use self::common::Query;

mod happenings;
pub use self::happenings::{EligibilityQuery, HappeningsQuery};

mod telegram;
pub use self::telegram::TelegramQuery;

//! Wire-level types returned by the client.

mod happening;

pub use self::happening::{Action, Happening, HappeningPattern, HappeningsFilter};

pub mod clock;
pub mod keys;
pub mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use record::LogRecord;

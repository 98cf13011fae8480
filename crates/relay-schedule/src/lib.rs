//! Receiver batch scheduling.
//!
//! Decides when a receiver's next batch is due. There is no stored state:
//! the batch trigger asks [`Timing::next_time`] or
//! [`Timing::batch_in_previous_60_seconds`] with the current instant and acts
//! on the answer.

#![deny(unsafe_code)]

pub mod error;
pub mod receiver;
pub mod time_zone;
pub mod timing;

pub use error::{Result, TimingError};
pub use receiver::{FULL_NAME_SEPARATOR, Receiver, parse_full_name};
pub use time_zone::UsTimeZone;
pub use timing::{BatchOperation, EmptyOperation, MAX_NUMBER_PER_DAY, Timing, WhenEmpty};

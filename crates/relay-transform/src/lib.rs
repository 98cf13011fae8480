//! Value conversion between canonical and external representations.
//!
//! This crate implements the per-field conversion engine:
//!
//! - **convert**: `ElementConversion` (normalize, format, check) for `Element`
//! - **date**: ordered date and datetime parse strategies
//! - **code**: coded values through value sets and alt values
//! - **phone**: telephone parsing into `national:country:extension`
//! - **postal**: postal code checks and US ZIP formatting
//! - **composite**: HD and EI composite identifiers
//! - **tokens**: format tokens and fixed patterns

pub mod code;
pub mod composite;
pub mod convert;
pub mod date;
pub mod error;
pub mod phone;
pub mod postal;
pub mod tokens;

pub use composite::{parse_ei, parse_hd};
pub use convert::ElementConversion;
pub use date::{LOCAL_TIME_ZONE, convert_positive_offset_to_negative};
pub use error::ConversionError;
pub use phone::{PhoneNumber, parse_phone};

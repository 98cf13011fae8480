//! Format tokens and fixed patterns.
//!
//! Tokens select a representation when formatting or normalizing a value
//! (for example `$display` on a coded element). Date patterns use `chrono`
//! strftime syntax.

/// Canonical date, e.g. `20210315`.
pub const DATE_PATTERN: &str = "%Y%m%d";
pub const DATE_PATTERN_MMDDYYYY: &str = "%m%d%Y";
/// Canonical datetime, e.g. `202103151230-0500`.
pub const DATETIME_PATTERN: &str = "%Y%m%d%H%M%z";
/// Canonical datetime with seconds and milliseconds.
pub const HIGH_PRECISION_DATETIME_PATTERN: &str = "%Y%m%d%H%M%S%.3f%z";

/// Dates seen typed by hand into EMR systems, tried in order after `-` is replaced with `/`.
pub const MANUALLY_ENTERED_DATE_FORMATS: &[&str] = &[
    DATE_PATTERN,
    "%m/%d/%Y",
    DATE_PATTERN_MMDDYYYY,
    "%Y/%m/%d",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M",
];

/// Last-resort datetimes carrying an offset.
pub const VARIABLE_OFFSET_PATTERNS: &[&str] = &["%Y%m%d%H%M%S%z", "%Y%m%d%H%M%z"];

/// Last-resort datetimes without an offset.
pub const VARIABLE_LOCAL_PATTERNS: &[&str] = &[
    "%Y%m%d%H%M%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y%m%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Last-resort bare dates.
pub const VARIABLE_DATE_PATTERNS: &[&str] = &["%Y-%m-%d", DATE_PATTERN, "%m/%d/%Y", "%Y/%m/%d"];

// Coded values
pub const DISPLAY_TOKEN: &str = "$display";
pub const CARET_TOKEN: &str = "$code^$display^$system";
pub const CODE_TOKEN: &str = "$code";
pub const SYSTEM_TOKEN: &str = "$system";
pub const ALT_DISPLAY_TOKEN: &str = "$alt";

// Telephone
pub const AREA_CODE_TOKEN: &str = "$area";
pub const EXCHANGE_TOKEN: &str = "$exchange";
pub const SUBSCRIBER_TOKEN: &str = "$subscriber";
pub const COUNTRY_CODE_TOKEN: &str = "$country";
pub const EXTENSION_TOKEN: &str = "$extension";
pub const E164_TOKEN: &str = "$e164";
pub const DEFAULT_PHONE_FORMAT: &str = "$area$exchange$subscriber";
pub const PHONE_DELIMITER: &str = ":";

// Hierarchic designator
pub const HD_DELIMITER: &str = "^";
pub const HD_NAME_TOKEN: &str = "$name";
pub const HD_UNIVERSAL_ID_TOKEN: &str = "$universalId";
pub const HD_SYSTEM_TOKEN: &str = "$system";
pub const HD_COMPLETE_FORMAT: &str = "$complete";

// Entity identifier
pub const EI_DELIMITER: &str = "^";
pub const EI_NAME_TOKEN: &str = "$name";
pub const EI_NAMESPACE_ID_TOKEN: &str = "$namespaceId";
pub const EI_UNIVERSAL_ID_TOKEN: &str = "$universalId";
pub const EI_SYSTEM_TOKEN: &str = "$system";
pub const EI_COMPLETE_FORMAT: &str = "$complete";

/// Universal id system assumed when a composite is assembled without one.
pub const DEFAULT_UNIVERSAL_ID_SYSTEM: &str = "ISO";

// Postal codes
pub const ZIP_FIVE_TOKEN: &str = "$zipFive";
pub const ZIP_FIVE_PLUS_FOUR_TOKEN: &str = "$zipFivePlusFour";

/// System code written for HL7 table 0136 `UNK`.
pub const NULL_FLAVOR_SYSTEM: &str = "NULLFL";

//! US time zones a receiver can schedule in.

use std::fmt;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A US time zone, named the way receiver settings name it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsTimeZone {
    Pacific,
    Mountain,
    Arizona,
    Central,
    #[default]
    Eastern,
    EastIndiana,
    IndianaStarke,
    Michigan,
    Alaska,
    Aleutian,
    Hawaii,
    Samoa,
    Chamorro,
}

impl UsTimeZone {
    pub const ALL: [UsTimeZone; 13] = [
        UsTimeZone::Pacific,
        UsTimeZone::Mountain,
        UsTimeZone::Arizona,
        UsTimeZone::Central,
        UsTimeZone::Eastern,
        UsTimeZone::EastIndiana,
        UsTimeZone::IndianaStarke,
        UsTimeZone::Michigan,
        UsTimeZone::Alaska,
        UsTimeZone::Aleutian,
        UsTimeZone::Hawaii,
        UsTimeZone::Samoa,
        UsTimeZone::Chamorro,
    ];

    /// The IANA zone.
    pub fn tz(self) -> Tz {
        match self {
            UsTimeZone::Pacific => chrono_tz::US::Pacific,
            UsTimeZone::Mountain => chrono_tz::US::Mountain,
            UsTimeZone::Arizona => chrono_tz::US::Arizona,
            UsTimeZone::Central => chrono_tz::US::Central,
            UsTimeZone::Eastern => chrono_tz::US::Eastern,
            UsTimeZone::EastIndiana => chrono_tz::US::EastIndiana,
            UsTimeZone::IndianaStarke => chrono_tz::US::IndianaStarke,
            UsTimeZone::Michigan => chrono_tz::US::Michigan,
            UsTimeZone::Alaska => chrono_tz::US::Alaska,
            UsTimeZone::Aleutian => chrono_tz::US::Aleutian,
            UsTimeZone::Hawaii => chrono_tz::US::Hawaii,
            UsTimeZone::Samoa => chrono_tz::US::Samoa,
            UsTimeZone::Chamorro => chrono_tz::Pacific::Guam,
        }
    }

    /// IANA identifier, e.g. `US/Eastern`.
    pub fn zone_id(self) -> &'static str {
        self.tz().name()
    }
}

impl fmt::Display for UsTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.zone_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_ids() {
        assert_eq!(UsTimeZone::Eastern.zone_id(), "US/Eastern");
        assert_eq!(UsTimeZone::Chamorro.zone_id(), "Pacific/Guam");
        assert_eq!(UsTimeZone::default(), UsTimeZone::Eastern);
    }

    #[test]
    fn settings_names() {
        let zone: UsTimeZone = serde_json::from_str("\"EAST_INDIANA\"").unwrap();
        assert_eq!(zone, UsTimeZone::EastIndiana);
        assert_eq!(serde_json::to_string(&UsTimeZone::Central).unwrap(), "\"CENTRAL\"");
    }
}

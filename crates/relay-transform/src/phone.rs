//! Telephone number parsing for US-default input.
//!
//! Numbers without a `+` prefix are read as North American numbers. The
//! canonical form is `national:country:extension`, with the national number
//! zero-padded to ten digits.
//!
//! This accepts a subset of what libphonenumber does: layouts are not
//! checked per region, vanity letters are rejected, and a national trunk
//! prefix `0` is only absorbed because the national number is read as an
//! integer.

use crate::tokens::PHONE_DELIMITER;

/// Largest national number that fits the ten-digit canonical form.
pub const MAX_NATIONAL_NUMBER: u64 = 9_999_999_999;

const NANP_COUNTRY_CODE: u16 = 1;

/// ITU-T E.164 country calling codes. Codes are prefix-free.
const COUNTRY_CODES: &[u16] = &[
    1, 7, 20, 27, 30, 31, 32, 33, 34, 36, 39, 40, 41, 43, 44, 45, 46, 47, 48, 49, 51, 52, 53, 54,
    55, 56, 57, 58, 60, 61, 62, 63, 64, 65, 66, 81, 82, 84, 86, 90, 91, 92, 93, 94, 95, 98, 211,
    212, 213, 216, 218, 220, 221, 222, 223, 224, 225, 226, 227, 228, 229, 230, 231, 232, 233, 234,
    235, 236, 237, 238, 239, 240, 241, 242, 243, 244, 245, 246, 247, 248, 249, 250, 251, 252, 253,
    254, 255, 256, 257, 258, 260, 261, 262, 263, 264, 265, 266, 267, 268, 269, 290, 291, 297, 298,
    299, 350, 351, 352, 353, 354, 355, 356, 357, 358, 359, 370, 371, 372, 373, 374, 375, 376, 377,
    378, 380, 381, 382, 383, 385, 386, 387, 389, 420, 421, 423, 500, 501, 502, 503, 504, 505, 506,
    507, 508, 509, 590, 591, 592, 593, 594, 595, 596, 597, 598, 599, 670, 672, 673, 674, 675, 676,
    677, 678, 679, 680, 681, 682, 683, 685, 686, 687, 688, 689, 690, 691, 692, 800, 808, 850, 852,
    853, 855, 856, 870, 878, 880, 881, 882, 883, 886, 888, 960, 961, 962, 963, 964, 965, 966, 967,
    968, 970, 971, 972, 973, 974, 975, 976, 977, 979, 992, 993, 994, 995, 996, 998,
];

/// Punctuation allowed between digits.
const SEPARATORS: &[char] = &[' ', '-', '.', '(', ')', '/', '\t'];

/// A parsed telephone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub national_number: u64,
    pub country_code: u16,
    pub extension: String,
}

impl PhoneNumber {
    /// `national:country:extension`
    pub fn to_canonical(&self) -> String {
        format!(
            "{:010}{PHONE_DELIMITER}{}{PHONE_DELIMITER}{}",
            self.national_number, self.country_code, self.extension
        )
    }
}

/// Splits off an extension introduced by `extension`, `ext`, `x` or `#`.
///
/// Only the leading digits after the marker are kept.
fn split_extension(value: &str) -> (&str, String) {
    let lower = value.to_ascii_lowercase();
    let marker = lower.char_indices().find_map(|(index, c)| {
        let rest = &lower[index..];
        if rest.starts_with("extension") {
            Some((index, "extension".len()))
        } else if rest.starts_with("ext") {
            Some((index, "ext".len()))
        } else if c == 'x' || c == '#' {
            Some((index, 1))
        } else {
            None
        }
    });
    let Some((index, len)) = marker else {
        return (value, String::new());
    };
    let extension = value[index + len..]
        .trim_start_matches(|c: char| c == '.' || c == ':' || c == '=' || c.is_whitespace())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    (&value[..index], extension)
}

fn split_country_code(digits: &str) -> Option<(u16, &str)> {
    (1..=3).find_map(|len| {
        let prefix = digits.get(..len)?;
        let code: u16 = prefix.parse().ok()?;
        COUNTRY_CODES
            .contains(&code)
            .then(|| (code, &digits[len..]))
    })
}

/// Parses a telephone number, defaulting to the US when no country code is given.
///
/// Returns `None` for values that are not a phone number, or whose national
/// number is shorter than two digits or longer than ten.
pub fn parse_phone(value: &str) -> Option<PhoneNumber> {
    let (number, extension) = split_extension(value.trim());
    let number = number.trim();
    let international = number.starts_with('+');
    let body = number.strip_prefix('+').unwrap_or(number);

    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || SEPARATORS.contains(&c))
    {
        return None;
    }
    let digits: String = body.chars().filter(char::is_ascii_digit).collect();

    let (country_code, national) = if international {
        split_country_code(&digits)?
    } else if let Some(rest) = digits.strip_prefix("011").filter(|rest| rest.len() > 10) {
        // US international dialing prefix
        split_country_code(rest)?
    } else if digits.len() == 11 && digits.starts_with('1') {
        (NANP_COUNTRY_CODE, &digits[1..])
    } else {
        (NANP_COUNTRY_CODE, digits.as_str())
    };

    if national.len() < 2 || national.len() > 17 {
        return None;
    }
    let national_number: u64 = national.parse().ok()?;
    if national_number == 0 || national_number > MAX_NATIONAL_NUMBER {
        return None;
    }
    Some(PhoneNumber {
        national_number,
        country_code,
        extension,
    })
}

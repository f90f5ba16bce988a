//! validators.rs - Programmatic validation for specific finding types.
//!
//! Pattern matches for structured identifiers (SSNs, payment cards) are
//! cheap to trigger and expensive to be wrong about. Rules that set
//! `programmatic_validation` route their matched line through here, and the
//! finding is only emitted when the structural check agrees with the regex.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SSN_CANDIDATE: Regex =
        Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("SSN candidate pattern is valid");
    static ref CARD_CANDIDATE: Regex =
        Regex::new(r"\b(?:4\d{3}|5[1-5]\d{2}|3[47]\d{2}|6011)[- ]?\d{4}[- ]?\d{4}[- ]?\d{3,4}\b")
            .expect("card candidate pattern is valid");
}

/// Validates the structure of a US Social Security Number.
///
/// The SSA never issues numbers with an area of 000 or 666, an area in the
/// 900 range, a group of 00, or a serial of 0000. Literals violating those
/// rules are formatting coincidences, not PHI.
pub fn is_plausible_ssn(ssn: &str) -> bool {
    let parts: Vec<&str> = ssn.split('-').collect();
    if parts.len() != 3 {
        return false;
    }
    let (area, group, serial) = (parts[0], parts[1], parts[2]);
    if area.len() != 3 || group.len() != 2 || serial.len() != 4 {
        return false;
    }
    if area == "000" || area == "666" || area.starts_with('9') {
        return false;
    }
    if group == "00" || serial == "0000" {
        return false;
    }
    true
}

/// Validates a candidate number using the Luhn checksum.
pub fn is_valid_luhn(number: &str) -> bool {
    let digits: Vec<u32> = number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Routes a matched line through the validator registered for `rule_id`.
/// Rules without a registered validator pass unconditionally.
pub fn passes_programmatic_validation(rule_id: &str, line: &str) -> bool {
    match rule_id {
        "PHI-001" => SSN_CANDIDATE
            .find_iter(line)
            .any(|m| is_plausible_ssn(m.as_str())),
        "PHI-004" => CARD_CANDIDATE
            .find_iter(line)
            .any(|m| is_valid_luhn(m.as_str())),
        _ => {
            log::debug!("no programmatic validator registered for rule '{rule_id}'");
            true
        }
    }
}

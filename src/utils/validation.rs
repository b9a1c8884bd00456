//! Parameter string validation utilities.
//!
//! This module provides validation functions for the free-form radio
//! parameter strings that are passed through verbatim to the srsLTE
//! configuration scripts.

use regex::Regex;

/// Check that a frequency string is a plain or scientific-notation number,
/// e.g. `3435e6` or `2680000000`.
pub fn is_valid_frequency(value: &str) -> bool {
    let re = Regex::new(r"^[0-9]+(\.[0-9]+)?(e[0-9]+)?$").unwrap();
    re.is_match(value)
}

/// Check that a PRB/RBG mask string is either a binary bit string or a
/// hex literal, e.g. `0x001fff` or `111111111111`.
pub fn is_valid_prb_mask(value: &str) -> bool {
    let re = Regex::new(r"^(0x[0-9a-fA-F]+|[01]+)$").unwrap();
    re.is_match(value)
}

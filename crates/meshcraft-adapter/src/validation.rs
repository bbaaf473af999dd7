/*
[INPUT]:  User-entered printer device names and bind codes
[OUTPUT]: Normalized (uppercased) values or validation errors
[POS]:    Validation layer - client-side checks run before any request
[UPDATE]: When printer naming or bind code format changes
*/

use crate::http::{MeshcraftError, Result};

/// Length of a printer bind code
pub const BIND_CODE_LEN: usize = 6;

/// `PREFIX-SERIAL`, both parts ASCII alphanumeric, any case
pub fn is_valid_device_name(name: &str) -> bool {
    match name.split_once('-') {
        Some((prefix, serial)) => is_alnum_segment(prefix) && is_alnum_segment(serial),
        None => false,
    }
}

/// Exactly six ASCII alphanumerics, any case
pub fn is_valid_bind_code(code: &str) -> bool {
    code.len() == BIND_CODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

// The second hyphen in "A-B-C" lands in the serial and fails here
fn is_alnum_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn normalize_device_name(name: &str) -> Result<String> {
    let name = name.trim();
    if !is_valid_device_name(name) {
        return Err(MeshcraftError::validation(
            "device name",
            "expected letters/digits, a hyphen, then letters/digits (e.g. R1-AX6FFI)",
        ));
    }
    Ok(name.to_ascii_uppercase())
}

pub fn normalize_bind_code(code: &str) -> Result<String> {
    let code = code.trim();
    if !is_valid_bind_code(code) {
        return Err(MeshcraftError::validation(
            "bind code",
            format!("expected {BIND_CODE_LEN} letters or digits"),
        ));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("R1-AX6FFI", true)]
    #[case("r1-ax6ffi", true)]
    #[case("R1AX6FFI", false)]
    #[case("R1-", false)]
    #[case("-AX6FFI", false)]
    #[case("R1-AX-6FFI", false)]
    #[case("R1-AX6_FI", false)]
    #[case("", false)]
    fn test_device_name(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(is_valid_device_name(input), valid, "{input}");
    }

    #[rstest]
    #[case("A1B2C3", true)]
    #[case("a1b2c3", true)]
    #[case("A1B2C", false)]
    #[case("A1B2C3D", false)]
    #[case("A1B2-3", false)]
    fn test_bind_code(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(is_valid_bind_code(input), valid, "{input}");
    }

    #[test]
    fn test_normalize_uppercases() {
        assert_eq!(normalize_device_name(" r1-ax6ffi ").unwrap(), "R1-AX6FFI");
        assert_eq!(normalize_bind_code("a1b2c3").unwrap(), "A1B2C3");
        assert!(normalize_bind_code("abc").is_err());
    }

    #[test]
    fn test_normalize_trims_before_matching() {
        // the raw patterns reject padding; the normalizers strip it first
        assert!(!is_valid_device_name(" R1-AX6FFI "));
        assert!(!is_valid_bind_code(" A1B2C3\n"));
        assert_eq!(normalize_device_name("\tR1-AX6FFI ").unwrap(), "R1-AX6FFI");
        assert_eq!(normalize_bind_code(" a1b2c3\n").unwrap(), "A1B2C3");
        // inner whitespace is never stripped
        assert!(normalize_bind_code("a1b 2c3").is_err());
        assert!(normalize_device_name("R1 -AX6FFI").is_err());
    }
}

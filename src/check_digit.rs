//! Modulo 10 check digits as used by GTIN, SSCC, GLN and friends.
//!
//! Weights alternate 3 and 1, starting with 3 at the digit next to the check
//! digit, so the weight of the first digit depends on the total length.

/// Compute the check digit for a numeric payload.
///
/// Returns `None` if the payload contains a non-digit.
///
/// ```
/// # use gs1_encoders::check_digit;
/// assert_eq!(check_digit::compute(b"2401234567890"), Some(b'5'));
/// ```
pub fn compute(payload: &[u8]) -> Option<u8> {
    let mut sum = 0u32;
    for (i, &c) in payload.iter().rev().enumerate() {
        if !c.is_ascii_digit() {
            return None;
        }
        let weight = if i % 2 == 0 { 3 } else { 1 };
        sum += weight * (c - b'0') as u32;
    }
    Some(b'0' + ((10 - sum % 10) % 10) as u8)
}

/// Whether the last character of `value` is the correct check digit for the
/// digits preceding it.
pub fn is_valid(value: &[u8]) -> bool {
    match value.split_last() {
        Some((last, payload)) => compute(payload) == Some(*last),
        None => false,
    }
}

/// Validate the check digit and overwrite it with the correct one.
///
/// Returns `true` if the check digit was already correct. On `false` the last
/// byte of `value` now holds the computed check digit, unless the payload was
/// not numeric or empty, in which case `value` is untouched.
pub fn correct(value: &mut [u8]) -> bool {
    let Some((last, payload)) = value.split_last_mut() else {
        return false;
    };
    if payload.is_empty() {
        return false;
    }
    match compute(payload) {
        Some(digit) if digit == *last => true,
        Some(digit) => {
            *last = digit;
            false
        }
        None => false,
    }
}

#[test]
fn test_is_valid() {
    assert!(is_valid(b"24012345678905"));
    assert!(!is_valid(b"24012345678909"));
    assert!(is_valid(b"2112233789657"));
    assert!(!is_valid(b"2112233789658"));
    assert!(is_valid(b"416000336108"));
    assert!(!is_valid(b"416000336107"));
    assert!(is_valid(b"02345680"));
    assert!(!is_valid(b"02345689"));
    assert!(!is_valid(b""));
    assert!(!is_valid(b"0234568A"));
}

#[test]
fn test_correct() {
    let mut gtin14 = *b"24012345678909";
    assert!(!correct(&mut gtin14));
    assert_eq!(gtin14[13], b'5');
    assert!(correct(&mut gtin14));

    let mut gtin13 = *b"2112233789658";
    assert!(!correct(&mut gtin13));
    assert_eq!(gtin13[12], b'7');

    let mut gtin12 = *b"416000336107";
    assert!(!correct(&mut gtin12));
    assert_eq!(gtin12[11], b'8');

    let mut gtin8 = *b"02345689";
    assert!(!correct(&mut gtin8));
    assert_eq!(gtin8[7], b'0');

    let mut alpha = *b"0234568A9";
    assert!(!correct(&mut alpha));
    assert_eq!(&alpha, b"0234568A9");

    let mut lone = *b"7";
    assert!(!correct(&mut lone));
    assert_eq!(&lone, b"7");
    assert!(!correct(&mut []));
}

#[test]
fn test_compute() {
    assert_eq!(compute(b"1234567890123"), Some(b'1'));
    assert_eq!(compute(b"00614141123456789"), Some(b'0'));
    assert_eq!(compute(b""), Some(b'0'));
    assert_eq!(compute(b"12A"), None);
}

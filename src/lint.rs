use crate::std::string::{String, ToString};

use crate::check_digit;
use crate::SyntaxError;

/// The 82 characters permitted in alphanumeric AI values.
pub const CSET82: &[u8; 82] =
    b"!\"%&'()*+,-./0123456789:;<=>?ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// The 39 characters permitted in component/part identifiers.
pub const CSET39: &[u8; 39] = b"#-/0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The 32 characters used for alphanumeric check character pairs.
pub const CSET32: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

// The first 97 primes, sufficient for values up to 99 characters.
const PRIMES: [u16; 97] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293,
    307, 311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419,
    421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509,
];

/// Character set of an AI component.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Cset {
    /// Digits only.
    Numeric,
    /// See [CSET82].
    Cset82,
    /// See [CSET39].
    Cset39,
}

impl Cset {
    /// Check that every character of `value` belongs to this set.
    ///
    /// `ai` is only used to label the error.
    pub fn lint(self, ai: &str, value: &[u8]) -> Result<(), SyntaxError> {
        log::trace!("      cset {:?} on AI ({})", self, ai);
        match self {
            Cset::Numeric if !value.iter().all(u8::is_ascii_digit) => {
                Err(SyntaxError::NonDigit(ai.to_string()))
            }
            Cset::Cset82 if !value.iter().all(|c| CSET82.contains(c)) => {
                Err(SyntaxError::Cset82(ai.to_string()))
            }
            Cset::Cset39 if !value.iter().all(|c| CSET39.contains(c)) => {
                Err(SyntaxError::Cset39(ai.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Additional checks applied to a component after its character set and
/// length have been checked.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Linter {
    /// The last digit is a modulo 10 check digit.
    CheckDigit,
    /// The last two characters are an alphanumeric check character pair.
    CheckPair,
}

impl Linter {
    pub fn lint(self, ai: &str, value: &[u8]) -> Result<(), SyntaxError> {
        log::trace!("      {:?} on AI ({})", self, ai);
        match self {
            Linter::CheckDigit if !check_digit::is_valid(value) => {
                Err(SyntaxError::CheckDigit(ai.to_string()))
            }
            Linter::CheckDigit => Ok(()),
            Linter::CheckPair => check_pair(value).map_err(|e| e(ai.to_string())),
        }
    }
}

fn cset82_index(c: u8) -> Option<u32> {
    CSET82.iter().position(|&x| x == c).map(|i| i as u32)
}

/// Verify the trailing check character pair of an alphanumeric value.
fn check_pair(value: &[u8]) -> Result<(), fn(String) -> SyntaxError> {
    let len = value.len();
    if len < 2 {
        return Err(SyntaxError::CheckPairTooShort);
    }
    if len > PRIMES.len() + 2 {
        return Err(SyntaxError::CheckPairTooLong);
    }
    let (payload, check) = value.split_at(len - 2);
    let mut sum = 0u32;
    for (i, &c) in payload.iter().enumerate() {
        let Some(idx) = cset82_index(c) else {
            return Err(SyntaxError::CheckPair);
        };
        sum += idx * PRIMES[len - 3 - i] as u32;
    }
    sum %= 1021;
    if check[0] != CSET32[(sum >> 5) as usize] || check[1] != CSET32[(sum & 31) as usize] {
        return Err(SyntaxError::CheckPair);
    }
    Ok(())
}

/// Whether the value ends with a correct alphanumeric check character pair.
///
/// ```
/// # use gs1_encoders::lint::is_valid_check_pair;
/// assert!(is_valid_check_pair("1987654Ad4X4bL5ttr2310c2K"));
/// assert!(!is_valid_check_pair("1987654Ad4X4bL5ttr2310cXK"));
/// ```
pub fn is_valid_check_pair(value: &str) -> bool {
    check_pair(value.as_bytes()).is_ok()
}

#[test]
fn test_cset() {
    assert!(Cset::Numeric.lint("01", b"0123456789").is_ok());
    assert_eq!(
        Cset::Numeric.lint("01", b"01234A"),
        Err(SyntaxError::NonDigit("01".into()))
    );
    assert!(Cset::Cset82.lint("99", CSET82).is_ok());
    assert_eq!(
        Cset::Cset82.lint("99", b"AB~C"),
        Err(SyntaxError::Cset82("99".into()))
    );
    assert_eq!(
        Cset::Cset82.lint("99", b"AB C"),
        Err(SyntaxError::Cset82("99".into()))
    );
    assert!(Cset::Cset39.lint("8010", b"#-/0AZ").is_ok());
    assert_eq!(
        Cset::Cset39.lint("8010", b"abc"),
        Err(SyntaxError::Cset39("8010".into()))
    );
    assert!(Cset::Numeric.lint("01", b"").is_ok());
}

#[test]
fn test_check_digit_linter() {
    assert!(Linter::CheckDigit.lint("01", b"12345678901231").is_ok());
    assert_eq!(
        Linter::CheckDigit.lint("01", b"12345678901234"),
        Err(SyntaxError::CheckDigit("01".into()))
    );
}

#[test]
fn test_check_pair() {
    let good: &[&str] = &[
        "1987654Ad4X4bL5ttr2310c2K",
        "12345678901234567890123NT",
        "12345_ABCDEFGHIJKLMCP",
        "12345_NOPQRSTUVWXYZDN",
        "12345_abcdefghijklmN3",
        "12345_nopqrstuvwxyzP2",
        "12345_!\"%&'()*+,-./LC",
        "12345_0123456789:;<=>?62",
        "7907665Bm8v2AB",
        "97850l6KZm0yCD",
        "225803106GSpEF",
        "149512464PM+GH",
        "62577B8fRG7HJK",
        "515942070CYxLM",
        "390800494sP6NP",
        "386830132uO+QR",
        "53395376X1:nST",
        "957813138Sb6UV",
        "530790no0qOgWX",
        "62185314IvwmYZ",
        "23956qk1&dB!23",
        "794394895ic045",
        "57453Uq3qA<H67",
        "0881063PhHvY89",
        "00000!HV",
        "99999zzzzzzzzzzzzzzzzzzT2",
    ];
    for value in good {
        assert!(is_valid_check_pair(value), "{}", value);
    }
    assert!(!is_valid_check_pair("1987654Ad4X4bL5ttr2310cXK"));
    assert!(!is_valid_check_pair("1987654Ad4X4bL5ttr2310c2X"));
}

#[test]
fn test_check_pair_bounds() {
    assert_eq!(
        Linter::CheckPair.lint("8013", b"2"),
        Err(SyntaxError::CheckPairTooShort("8013".into()))
    );
    assert!(Linter::CheckPair.lint("8013", b"22").is_ok());
    let long = [b'0'; 100];
    assert_eq!(
        Linter::CheckPair.lint("8013", &long),
        Err(SyntaxError::CheckPairTooLong("8013".into()))
    );
}

use crate::std::string::String;

#[cfg(feature = "std")]
use thiserror::Error;

/// Broad classes of [SyntaxError], for callers that only need to know what
/// kind of problem the input has.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Malformed bracketed syntax.
    Structural,
    /// The AI is not in the table, and may not be vivified.
    UnknownAi,
    /// A value is empty, too short, too long or contains the separator.
    Shape,
    /// A value contains a character outside of its character set.
    Charset,
    /// A check digit or check character pair is wrong.
    Checksum,
    /// Too much data, or too many AIs.
    Capacity,
    /// Unbracketed data without FNC1 in first position, or no data after it.
    MissingLeadSeparator,
    /// The Digital Link URI itself is malformed.
    Uri,
    /// Scan data carries an unusable symbology identifier.
    ScanData,
}

/// Errors that can occur while parsing or validating AI data.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum SyntaxError {
    /// Unbracketed data must start with FNC1.
    #[cfg_attr(feature = "std", error("Missing FNC1 in first position"))]
    MissingFnc1,
    /// Nothing follows the leading FNC1.
    #[cfg_attr(feature = "std", error("The AI data is empty"))]
    EmptyData,
    /// Bracketed data without any AI.
    #[cfg_attr(feature = "std", error("The bracketed AI data is empty"))]
    EmptyBracketed,
    /// Bracketed data where an AI in brackets was expected.
    #[cfg_attr(feature = "std", error("Expected an opening bracket before the AI"))]
    MissingBracket,
    /// The bracketed AI is not closed.
    #[cfg_attr(feature = "std", error("AI is not terminated by a closing bracket"))]
    UnterminatedAi,
    /// The bracketed AI has the wrong number of digits.
    #[cfg_attr(feature = "std", error("AI ({0}) must have between 2 and 4 digits"))]
    AiLength(String),
    /// No table entry matches the bracketed AI.
    #[cfg_attr(feature = "std", error("Unrecognised AI: {0}"))]
    UnrecognisedAi(String),
    /// No table entry matches the start of unbracketed data.
    #[cfg_attr(feature = "std", error("No known AI is a prefix of: {0}..."))]
    NoAiPrefix(String),
    #[cfg_attr(feature = "std", error("AI ({0}) data is empty"))]
    DataEmpty(String),
    #[cfg_attr(feature = "std", error("AI ({0}) value is too short"))]
    ValueTooShort(String),
    #[cfg_attr(feature = "std", error("AI ({0}) value is too long"))]
    ValueTooLong(String),
    /// The value contains the character used to stand for FNC1.
    #[cfg_attr(feature = "std", error("AI ({0}) contains illegal ^ character"))]
    IllegalFnc1(String),
    /// A component is shorter than its minimum length.
    #[cfg_attr(feature = "std", error("AI ({0}) data is too short"))]
    DataTooShort(String),
    /// Data remains after a value whose AI requires FNC1 termination.
    #[cfg_attr(feature = "std", error("AI ({0}) data is too long"))]
    DataTooLong(String),
    #[cfg_attr(feature = "std", error("AI ({0}): Incorrect CSET 82 character"))]
    Cset82(String),
    #[cfg_attr(feature = "std", error("AI ({0}): Incorrect CSET 39 character"))]
    Cset39(String),
    #[cfg_attr(feature = "std", error("AI ({0}): Illegal non-digit character"))]
    NonDigit(String),
    #[cfg_attr(feature = "std", error("AI ({0}): Incorrect check digit"))]
    CheckDigit(String),
    #[cfg_attr(
        feature = "std",
        error("AI ({0}): Alphanumeric string is too short to check")
    )]
    CheckPairTooShort(String),
    #[cfg_attr(
        feature = "std",
        error("AI ({0}): Alphanumeric string is too long to check")
    )]
    CheckPairTooLong(String),
    #[cfg_attr(feature = "std", error("AI ({0}): Bad alphanumeric check characters"))]
    CheckPair(String),
    #[cfg_attr(feature = "std", error("Too many AIs"))]
    TooManyAis,
    #[cfg_attr(feature = "std", error("Maximum data length exceeded"))]
    DataCapacity,
    #[cfg_attr(feature = "std", error("URI contains illegal characters"))]
    UriCharacters,
    #[cfg_attr(feature = "std", error("Scheme must be http:// or https://"))]
    UriScheme,
    #[cfg_attr(feature = "std", error("URI must contain a domain and path info"))]
    UriPathInfo,
    #[cfg_attr(feature = "std", error("No GS1 DL keys found in path info"))]
    NoDlKey,
    /// A percent-decoded Digital Link value is empty or longer than any AI value.
    #[cfg_attr(
        feature = "std",
        error("Decoded AI ({0}) value from DL URI is empty or too long")
    )]
    DlValue(String),
    #[cfg_attr(feature = "std", error("Unknown AI ({0}) in query parameters"))]
    UnknownQueryAi(String),
    #[cfg_attr(feature = "std", error("Unsupported symbology identifier: {0}"))]
    SymbologyId(String),
    /// The `^` character would be confused with FNC1.
    #[cfg_attr(feature = "std", error("Scan data contains illegal ^ character"))]
    ScanDataFnc1,
}

impl SyntaxError {
    /// The class of problem this error reports.
    pub fn kind(&self) -> ErrorKind {
        use SyntaxError::*;
        match self {
            MissingFnc1 | EmptyData => ErrorKind::MissingLeadSeparator,
            EmptyBracketed | MissingBracket | UnterminatedAi | AiLength(_) => {
                ErrorKind::Structural
            }
            UnrecognisedAi(_) | NoAiPrefix(_) | UnknownQueryAi(_) => ErrorKind::UnknownAi,
            DataEmpty(_) | ValueTooShort(_) | ValueTooLong(_) | IllegalFnc1(_)
            | DataTooShort(_) | DataTooLong(_) => ErrorKind::Shape,
            Cset82(_) | Cset39(_) | NonDigit(_) => ErrorKind::Charset,
            CheckDigit(_) | CheckPairTooShort(_) | CheckPairTooLong(_) | CheckPair(_) => {
                ErrorKind::Checksum
            }
            TooManyAis | DataCapacity => ErrorKind::Capacity,
            UriCharacters | UriScheme | UriPathInfo | NoDlKey | DlValue(_) => ErrorKind::Uri,
            SymbologyId(_) | ScanDataFnc1 => ErrorKind::ScanData,
        }
    }

    /// The AI the error refers to, if it is about a single AI.
    pub fn ai(&self) -> Option<&str> {
        use SyntaxError::*;
        match self {
            AiLength(ai) | UnrecognisedAi(ai) | DataEmpty(ai) | ValueTooShort(ai)
            | ValueTooLong(ai) | IllegalFnc1(ai) | DataTooShort(ai) | DataTooLong(ai)
            | Cset82(ai) | Cset39(ai) | NonDigit(ai) | CheckDigit(ai)
            | CheckPairTooShort(ai) | CheckPairTooLong(ai) | CheckPair(ai) | DlValue(ai)
            | UnknownQueryAi(ai) => Some(ai),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
#[test]
fn test_messages() {
    use crate::std::string::ToString;

    assert_eq!(
        SyntaxError::DataTooShort("01".into()).to_string(),
        "AI (01) data is too short"
    );
    assert_eq!(
        SyntaxError::NoAiPrefix("8912".into()).to_string(),
        "No known AI is a prefix of: 8912..."
    );
    assert_eq!(SyntaxError::TooManyAis.to_string(), "Too many AIs");
}

#[test]
fn test_kinds() {
    assert_eq!(SyntaxError::CheckPair("8013".into()).kind(), ErrorKind::Checksum);
    assert_eq!(SyntaxError::MissingFnc1.kind(), ErrorKind::MissingLeadSeparator);
    assert_eq!(SyntaxError::EmptyData.kind(), ErrorKind::MissingLeadSeparator);
    assert_eq!(SyntaxError::EmptyBracketed.kind(), ErrorKind::Structural);
    assert_eq!(SyntaxError::IllegalFnc1("10".into()).kind(), ErrorKind::Shape);
    assert_eq!(SyntaxError::IllegalFnc1("10".into()).ai(), Some("10"));
    assert_eq!(SyntaxError::DataCapacity.ai(), None);
}

//! Scan data, as transmitted by a barcode reader.
//!
//! Scan data starts with a symbology identifier. The leading FNC1 of the AI
//! data is implied by the identifier and every further FNC1 is transmitted as
//! the ASCII group separator.

use crate::std::string::{String, ToString};

use crate::{AiData, AiParser, SyntaxError, FNC1};

const GS: char = '\x1d';

/// Symbologies that carry AI data, by their identifier in GS1 mode.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SymbologyId {
    /// `]C1`
    Gs1_128,
    /// `]e0`, shared by the GS1 DataBar family and composites.
    DataBarExpanded,
    /// `]d2`
    DataMatrix,
    /// `]Q3`
    QrCode,
}

impl SymbologyId {
    const ALL: [SymbologyId; 4] = [
        SymbologyId::Gs1_128,
        SymbologyId::DataBarExpanded,
        SymbologyId::DataMatrix,
        SymbologyId::QrCode,
    ];

    /// The three character symbology identifier.
    pub fn identifier(self) -> &'static str {
        match self {
            SymbologyId::Gs1_128 => "]C1",
            SymbologyId::DataBarExpanded => "]e0",
            SymbologyId::DataMatrix => "]d2",
            SymbologyId::QrCode => "]Q3",
        }
    }

    /// Find the symbology by identifier. Identifiers of symbologies not in
    /// GS1 mode, such as `]Q1`, are not recognized.
    pub fn from_identifier(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sym| sym.identifier() == id)
    }
}

impl AiData {
    /// The scan data a reader transmits for a symbol carrying this data.
    ///
    /// ```
    /// # use gs1_encoders::{AiData, SymbologyId};
    /// let data = AiData::parse_bracketed("(01)12312312312333(10)ABC123(99)TESTING").unwrap();
    /// assert_eq!(
    ///     data.to_scan_data(SymbologyId::DataMatrix),
    ///     "]d2011231231231233310ABC123\x1d99TESTING",
    /// );
    /// ```
    pub fn to_scan_data(&self, sym: SymbologyId) -> String {
        let data = self.as_str();
        let body = data.strip_prefix(FNC1 as char).unwrap_or(data);
        let body = body.strip_suffix(FNC1 as char).unwrap_or(body);

        let mut out = String::with_capacity(3 + body.len());
        out.push_str(sym.identifier());
        out.extend(body.chars().map(|c| if c == FNC1 as char { GS } else { c }));
        out
    }
}

impl AiParser {
    /// Parse scan data of a symbology in GS1 mode.
    ///
    /// Returns the symbology with the extracted AI data.
    pub fn parse_scan_data(&self, scan: &str) -> Result<(SymbologyId, AiData), SyntaxError> {
        log::debug!("Processing scan data: {:?}", scan);
        let id = scan.get(..3).unwrap_or(scan);
        let sym = SymbologyId::from_identifier(id)
            .ok_or_else(|| SyntaxError::SymbologyId(id.to_string()))?;

        let body = &scan[3..];
        if body.contains(FNC1 as char) {
            return Err(SyntaxError::ScanDataFnc1);
        }

        let mut data = String::with_capacity(1 + body.len());
        data.push(FNC1 as char);
        data.extend(body.chars().map(|c| if c == GS { FNC1 as char } else { c }));

        Ok((sym, self.parse_unbracketed(&data)?))
    }
}

#[cfg(test)]
fn scan(sym: SymbologyId, input: &str) -> String {
    AiData::parse_unbracketed(input).unwrap().to_scan_data(sym)
}

#[test]
fn test_to_scan_data() {
    use SymbologyId::*;
    assert_eq!(
        scan(QrCode, "^011231231231233310ABC123^99TESTING"),
        "]Q3011231231231233310ABC123\x1d99TESTING"
    );
    assert_eq!(
        scan(DataMatrix, "^011231231231233310ABC123^99TESTING^"),
        "]d2011231231231233310ABC123\x1d99TESTING"
    );
    assert_eq!(
        scan(Gs1_128, "^011231231231233310ABC123^99TESTING"),
        "]C1011231231231233310ABC123\x1d99TESTING"
    );
    assert_eq!(
        scan(DataBarExpanded, "^011231231231233310ABC123^1199122598TESTING^97XYZ"),
        "]e0011231231231233310ABC123\x1d1199122598TESTING\x1d97XYZ"
    );
}

#[cfg(test)]
fn parse(scan: &str) -> Result<(SymbologyId, String), SyntaxError> {
    AiParser::default()
        .parse_scan_data(scan)
        .map(|(sym, data)| (sym, data.as_str().to_string()))
}

#[test]
fn test_parse_scan_data() {
    use SymbologyId::*;
    let ok = |scan: &str, sym: SymbologyId, expect: &str| {
        assert_eq!(parse(scan), Ok((sym, expect.to_string())), "{:?}", scan);
    };
    ok(
        "]Q3011231231231233310ABC123\x1d99TESTING",
        QrCode,
        "^011231231231233310ABC123^99TESTING",
    );
    ok(
        "]d2011231231231233310ABC123\x1d99TESTING",
        DataMatrix,
        "^011231231231233310ABC123^99TESTING",
    );
    ok(
        "]e0011231231231233310ABC123\x1d99TESTING\x1d98XYZ",
        DataBarExpanded,
        "^011231231231233310ABC123^99TESTING^98XYZ",
    );
    ok(
        "]e0011231231231233310ABC123\x1d1199122598TESTING\x1d97XYZ",
        DataBarExpanded,
        "^011231231231233310ABC123^1199122598TESTING^97XYZ",
    );
    ok(
        "]C1011231231231233310ABC123\x1d99TESTING",
        Gs1_128,
        "^011231231231233310ABC123^99TESTING",
    );
}

#[test]
fn test_parse_scan_data_errors() {
    assert_eq!(parse(""), Err(SyntaxError::SymbologyId("".into())));
    assert_eq!(parse("ABC"), Err(SyntaxError::SymbologyId("ABC".into())));
    assert_eq!(parse("]X"), Err(SyntaxError::SymbologyId("]X".into())));
    assert_eq!(parse("]XX"), Err(SyntaxError::SymbologyId("]XX".into())));
    assert_eq!(parse("]Q1TESTING"), Err(SyntaxError::SymbologyId("]Q1".into())));
    assert_eq!(parse("]d1TESTING"), Err(SyntaxError::SymbologyId("]d1".into())));
    assert_eq!(parse("]e0"), Err(SyntaxError::EmptyData));
    assert_eq!(parse("]C1"), Err(SyntaxError::EmptyData));
    assert_eq!(parse("]Q3^0112312312312333"), Err(SyntaxError::ScanDataFnc1));
    assert_eq!(parse("]d20112312312312334"), Err(SyntaxError::CheckDigit("01".into())));
}

#[test]
fn test_scan_data_round_trip() {
    let data = AiData::parse_bracketed("(01)12312312312333(10)ABC123(99)TESTING").unwrap();
    for sym in SymbologyId::ALL {
        let (parsed_sym, parsed) = AiParser::default()
            .parse_scan_data(&data.to_scan_data(sym))
            .unwrap();
        assert_eq!(parsed_sym, sym);
        assert_eq!(parsed, data);
    }
}

//! This crate implements the GS1 Application Identifier (AI) syntax used by
//! GS1 barcodes, and encoding of that data as GS1-128 linear barcodes.
//!
//! AI data can be given in bracketed form, as a GS1 Digital Link URI, or as
//! scan data. Each is validated against the table of AIs from the GS1 General
//! Specifications and converted into the canonical unbracketed form that
//! barcode symbols carry.
//!
//! ## Example
//!
//! ```rust
//! use gs1_encoders::{AiData, Gs1_128};
//!
//! let data = AiData::parse_bracketed("(01)12345678901231(10)ABC123").unwrap();
//! assert_eq!(data.as_str(), "^011234567890123110ABC123");
//! assert_eq!(data.hri(false), ["(01) 12345678901231", "(10) ABC123"]);
//!
//! let code = Gs1_128::encode(&data);
//! assert!(code.len() > 0);
//! ```
//!
//! ## Canonical form
//!
//! The canonical form starts with FNC1, represented by `^`, followed by each
//! AI and its value. Values of AIs with a predefined length, such as the GTIN
//! in AI (01), simply run into the next AI. All other values are terminated by
//! FNC1 unless they are last.
//!
//! ## Unknown AIs
//!
//! By default only AIs in the table are accepted. An [AiParser] created with
//! [`with_unknown_ais(true)`](AiParser::with_unknown_ais) accepts any other
//! AI as long as its length agrees with the AIs sharing its first two digits,
//! and its value consists of 1 to 90 characters of CSET 82.
#![no_std]

#[cfg(not(feature = "std"))]
extern crate alloc as std;
#[cfg(feature = "std")]
extern crate std;

use core::ops::Range;

use std::format;
use std::string::String;
use std::vec::Vec;

mod ai;
pub mod check_digit;
mod decode;
mod dl;
mod encode;
mod error;
pub mod lint;
mod scandata;
mod table;
#[cfg(feature = "unicode")]
mod unicode;

pub use ai::check_value_shape;
pub use decode::{decode, DecodingError};
pub use error::{ErrorKind, SyntaxError};
pub use lint::{Cset, Linter};
pub use scandata::SymbologyId;
pub use table::{
    entries, is_fnc1_required, length_by_prefix, lookup_exact, AiEntry, Component,
    FIXED_LENGTH_PREFIXES,
};

#[cfg(feature = "unicode")]
pub use unicode::bars_to_blocks;

/// The character representing FNC1 in canonical AI data.
pub const FNC1: u8 = b'^';
/// Maximum length of canonical AI data.
pub const MAX_DATA: usize = 8191;
/// Maximum number of AIs in one message.
pub const MAX_AIS: usize = 64;
/// Maximum length of any AI value.
pub const MAX_AI_LEN: usize = 90;

const SHIFT_MODE: u8 = 98;
const SWITCH_C: u8 = 99;
const SWITCH_B: u8 = 100;
const SWITCH_A: u8 = 101;
const FNC1_SYMBOL: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 108;

fn checksum(symbols: impl Iterator<Item = u8>) -> u8 {
    (symbols
        .enumerate()
        .map(|(i, idx)| (i.max(1) as u64) * idx as u64)
        .sum::<u64>()
        % 103) as u8
}

/// Options for parsing AI data.
///
/// The default parser only accepts AIs that are in the table.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiParser {
    permit_unknown_ais: bool,
}

impl AiParser {
    /// Whether AIs missing from the table are accepted.
    pub fn with_unknown_ais(self, permit_unknown_ais: bool) -> Self {
        Self { permit_unknown_ais }
    }

    /// Find the table entry of an AI.
    ///
    /// If `ai_len` is zero, the entry whose AI is a prefix of `data` is
    /// returned. Otherwise the AI is the first `ai_len` characters of `data`.
    ///
    /// ```
    /// # use gs1_encoders::AiParser;
    /// let parser = AiParser::default();
    /// assert_eq!(parser.lookup("011234", 0).unwrap().title, "GTIN");
    /// assert!(parser.lookup("011", 3).is_none());
    /// ```
    pub fn lookup(&self, data: &str, ai_len: usize) -> Option<&'static AiEntry> {
        ai::lookup(data.as_bytes(), ai_len, self.permit_unknown_ais)
    }

    /// Parse bracketed AI data, such as `(01)12345678901231(10)ABC`.
    ///
    /// A bracket that is part of a value is escaped as `\(`.
    pub fn parse_bracketed(&self, input: &str) -> Result<AiData, SyntaxError> {
        ai::parse_bracketed(input, self.permit_unknown_ais)
    }

    /// Validate canonical AI data.
    ///
    /// With `extract` the AIs are also returned. Extraction fails for unknown
    /// AIs whose length is not defined by their prefix, even where plain
    /// validation succeeds.
    pub fn process(
        &self,
        data: &str,
        extract: bool,
    ) -> Result<Option<Vec<AiValue>>, SyntaxError> {
        let ais = ai::process(data, extract, self.permit_unknown_ais)?;
        Ok(extract.then_some(ais))
    }

    /// Validate canonical AI data and extract its AIs.
    pub fn parse_unbracketed(&self, data: &str) -> Result<AiData, SyntaxError> {
        let ais = ai::process(data, true, self.permit_unknown_ais)?;
        Ok(AiData {
            data: data.into(),
            ais,
        })
    }
}

/// An AI within canonical AI data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiValue {
    pub entry: &'static AiEntry,
    /// Position of the AI digits.
    pub ai: Range<usize>,
    /// Position of the value.
    pub value: Range<usize>,
}

/// An AI and its value, borrowed from [AiData].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedAi<'a> {
    pub entry: &'static AiEntry,
    pub ai: &'a str,
    pub value: &'a str,
}

/// Validated AI data in canonical form, with the AIs it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiData {
    data: String,
    ais: Vec<AiValue>,
}

impl AiData {
    /// Parse bracketed AI data with the default [AiParser].
    pub fn parse_bracketed(input: &str) -> Result<Self, SyntaxError> {
        AiParser::default().parse_bracketed(input)
    }

    /// Parse canonical AI data with the default [AiParser].
    pub fn parse_unbracketed(data: &str) -> Result<Self, SyntaxError> {
        AiParser::default().parse_unbracketed(data)
    }

    /// Parse a GS1 Digital Link URI with the default [AiParser].
    pub fn parse_dl_uri(uri: &str) -> Result<Self, SyntaxError> {
        AiParser::default().parse_dl_uri(uri)
    }

    /// The data in canonical form.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// The positions of the AIs, in order of appearance.
    pub fn values(&self) -> &[AiValue] {
        &self.ais
    }

    /// The AIs, in order of appearance.
    pub fn ais(&self) -> impl Iterator<Item = ExtractedAi<'_>> + '_ {
        self.ais.iter().map(|ai| ExtractedAi {
            entry: ai.entry,
            ai: &self.data[ai.ai.clone()],
            value: &self.data[ai.value.clone()],
        })
    }

    /// The value of the first occurrence of an AI.
    pub fn get(&self, ai: &str) -> Option<&str> {
        self.ais().find(|x| x.ai == ai).map(|x| x.value)
    }

    /// Human readable interpretation, one line per AI.
    ///
    /// With `titles` each line is preceded by the AI's data title, if it has
    /// one.
    ///
    /// ```
    /// # use gs1_encoders::AiData;
    /// let data = AiData::parse_bracketed("(01)12345678901231(17)991225").unwrap();
    /// assert_eq!(
    ///     data.hri(true),
    ///     ["GTIN (01) 12345678901231", "USE BY or EXPIRY (17) 991225"],
    /// );
    /// ```
    pub fn hri(&self, titles: bool) -> Vec<String> {
        self.ais()
            .map(|x| match x.entry.title {
                title if titles && !title.is_empty() => {
                    format!("{} ({}) {}", title, x.ai, x.value)
                }
                _ => format!("({}) {}", x.ai, x.value),
            })
            .collect()
    }

    /// The data in bracketed form, escaping brackets within values.
    pub fn to_bracketed(&self) -> String {
        let mut out = String::with_capacity(self.data.len() + 2 * self.ais.len());
        for x in self.ais() {
            out.push('(');
            out.push_str(x.ai);
            out.push(')');
            for c in x.value.chars() {
                if c == '(' {
                    out.push('\\');
                }
                out.push(c);
            }
        }
        out
    }
}

/// Representation of a "black line" in the code.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Bar {
    /// The width of the line.
    ///
    /// Ranges from one to four.
    pub width: u8,
    /// White space after the line.
    pub space: u8,
}

/// A coordinate of a bar in a barcode.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct BarCoordinate {
    /// The x coordinate, started from the left.
    ///
    /// The first bar will always be at 10, which is the
    /// offset for the left quiet zone.
    pub x: u32,
    /// The width of the bar.
    pub width: u8,
}

/// A GS1-128 symbol, a Code 128 carrying AI data.
///
/// The symbol starts with FNC1 and every FNC1 of the canonical data is
/// encoded as the FNC1 symbol character. The bars are obtained from
/// [`bars()`](Self::bars) or [`bar_coordinates()`](Self::bar_coordinates);
/// see [Bar] for the unit of their widths.
///
/// The standard demands a quiet zone of ten modules on either side, which is
/// included in [len](Self::len).
pub struct Gs1_128 {
    indices: Vec<u8>,
}

impl Gs1_128 {
    /// Encode validated AI data.
    pub fn encode(data: &AiData) -> Self {
        let mut indices = encode::encode_as_indices(data.as_str().as_bytes());
        indices.push(checksum(indices.iter().cloned()));
        indices.push(STOP);
        Self { indices }
    }

    /// The symbol characters, from start character to stop character.
    pub fn symbols(&self) -> &[u8] {
        &self.indices
    }

    /// Get the sequence of bars this symbol consists of.
    pub fn bars(&self) -> impl Iterator<Item = Bar> + '_ {
        self.indices
            .iter()
            .flat_map(|idx| encode::bits_to_bars(encode::PATTERNS[*idx as usize]))
    }

    /// Get the coordinates of the bars this symbol consists of.
    pub fn bar_coordinates(&self) -> impl Iterator<Item = BarCoordinate> + '_ {
        self.bars().scan(10, |pos, bar| {
            let x = *pos;
            *pos += bar.width as u32 + bar.space as u32;
            Some(BarCoordinate {
                x,
                width: bar.width,
            })
        })
    }

    /// Get the total width of the code in units of the [Bar](crate::Bar)
    /// with the quiet zone included.
    pub fn len(&self) -> usize {
        self.indices.len() * 11 + 2 + 20
    }

    /// Always `false`, a symbol carries at least one AI.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
use std::vec;

#[test]
fn test_bar_size() {
    for pattern in &encode::PATTERNS[0..107] {
        let size: u32 = encode::bits_to_bars(*pattern)
            .into_iter()
            .map(|m| m.width as u32 + m.space as u32)
            .sum();
        assert_eq!(size, 11);
    }

    let size: u32 = encode::bits_to_bars(encode::PATTERNS[STOP as usize])
        .into_iter()
        .map(|m| m.width as u32 + m.space as u32)
        .sum();
    assert_eq!(size, 13);
}

#[test]
fn test_code_size() {
    let data = AiData::parse_bracketed("(01)12345678901231(10)ABC").unwrap();
    let code = Gs1_128::encode(&data);
    let size = code
        .bars()
        .map(|m| m.width as u32 + m.space as u32)
        .sum::<u32>()
        + 20;
    assert_eq!(code.len(), size as usize);
}

#[test]
fn test_symbols() {
    let data = AiData::parse_bracketed("(01)12345678901231").unwrap();
    let code = Gs1_128::encode(&data);
    let sum = checksum([START_C, FNC1_SYMBOL, 1, 12, 34, 56, 78, 90, 12, 31].into_iter());
    assert_eq!(
        code.symbols(),
        [START_C, FNC1_SYMBOL, 1, 12, 34, 56, 78, 90, 12, 31, sum, STOP]
    );
}

#[test]
fn test_encode_decode() {
    for input in [
        "(01)12345678901231",
        "(01)12345678901231(10)ABC123(21)12345",
        "(10)1(21)A1B2C3D4E5(99)Hello!",
        "(3103)000195(3922)0299(17)201225",
        "(8003)02112345678900ABC(21)a\\(b",
    ] {
        let data = AiData::parse_bracketed(input).unwrap();
        let bars: Vec<Bar> = Gs1_128::encode(&data).bars().collect();
        assert_eq!(decode(&bars).as_deref(), Ok(data.as_str()), "{}", input);
    }
}

#[test]
fn test_bar_coordinates() {
    let data = AiData::parse_bracketed("(99)A").unwrap();
    let bars: Vec<_> = Gs1_128::encode(&data).bar_coordinates().collect();
    // start character
    assert_eq!(bars[0], BarCoordinate { x: 10, width: 2 });
    assert_eq!(bars[1], BarCoordinate { x: 13, width: 1 });
    assert_eq!(bars[2], BarCoordinate { x: 16, width: 1 });
    // FNC1
    assert_eq!(bars[3], BarCoordinate { x: 21, width: 4 });
    assert_eq!(bars.len(), 6 * 3 + 4);
}

#[test]
fn test_parser() {
    let parser = AiParser::default();
    assert_eq!(parser.process("^0112345678901231", false), Ok(None));
    assert_eq!(
        parser.process("^0112345678901234", false),
        Err(SyntaxError::CheckDigit("01".into()))
    );
    let ais = parser.process("^0112345678901231991234", true).unwrap().unwrap();
    assert_eq!(ais.len(), 2);
    assert_eq!((ais[1].ai.clone(), ais[1].value.clone()), (17..19, 19..23));

    let lenient = AiParser::default().with_unknown_ais(true);
    assert!(lenient.process("^891234", true).is_err());
    assert_eq!(lenient.process("^891234", false), Ok(None));
    assert!(lenient.parse_bracketed("(89)1234").is_ok());
}

#[test]
fn test_ai_data() {
    let data = AiData::parse_unbracketed("^0112345678901231^10ABC(1)^99XYZ").unwrap();
    assert_eq!(data.get("10"), Some("ABC(1)"));
    assert_eq!(data.get("21"), None);
    assert_eq!(data.values().len(), 3);
    assert_eq!(data.to_bracketed(), "(01)12345678901231(10)ABC\\(1)(99)XYZ");
    assert_eq!(
        AiData::parse_bracketed(&data.to_bracketed()).unwrap().as_str(),
        "^011234567890123110ABC(1)^99XYZ"
    );
    assert_eq!(
        data.hri(true),
        vec!["GTIN (01) 12345678901231", "BATCH/LOT (10) ABC(1)", "INTERNAL (99) XYZ"]
    );
}

#[test]
fn test_hri_without_title() {
    let data = AiData::parse_bracketed("(8110)ABC").unwrap();
    assert_eq!(data.hri(true), ["(8110) ABC"]);
}

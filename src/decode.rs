use crate::std::string::String;
use crate::std::vec::Vec;

#[cfg(feature = "std")]
use thiserror::Error;

use crate::{AiData, AiParser, Bar, SyntaxError, FNC1};

/// Errors that can occur during decoding.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum DecodingError {
    /// A sequence of bars resulted in an unknown pattern.
    #[cfg_attr(feature = "std", error("pattern {0:b} not recognized"))]
    Pattern(u16),
    /// A bar's width or spacing is not valid.
    #[cfg_attr(feature = "std", error("bars are not valid"))]
    InvalidBars,
    /// The stop code at the end is wrong.
    #[cfg_attr(feature = "std", error("wrong stop code"))]
    WrongStop,
    /// The input was too short.
    #[cfg_attr(feature = "std", error("code too short to be valid"))]
    Short,
    /// The code's length can not fit an allowed sequence of bars.
    #[cfg_attr(feature = "std", error("length not correct"))]
    Length,
    /// The checksum did not match.
    #[cfg_attr(feature = "std", error("checksum mismatch"))]
    Checksum,
    /// The code did not start with a mode signal.
    #[cfg_attr(feature = "std", error("start char did not signal mode"))]
    NoMode,
    /// The first character after the start character is not FNC1, so this
    /// is a plain Code 128.
    #[cfg_attr(feature = "std", error("not a GS1-128, FNC1 missing after start char"))]
    NoFnc1,
    /// A symbol occurred in a mode that did not support it, or has no
    /// meaning in AI data.
    #[cfg_attr(feature = "std", error("unexpected character {0:x}"))]
    Unexpected(u8),
    /// The decoded data is not valid AI data.
    #[cfg_attr(feature = "std", error("{0}"))]
    Syntax(SyntaxError),
}

impl From<SyntaxError> for DecodingError {
    fn from(err: SyntaxError) -> Self {
        DecodingError::Syntax(err)
    }
}

pub(crate) fn lookup(pattern: u16) -> Result<u8, DecodingError> {
    const PATTERN_REVERSE: [u16; 109] = [
        0x426, 0x42c, 0x432, 0x434, 0x446, 0x44c, 0x458, 0x45e, 0x462, 0x464, 0x468, 0x46e, 0x476,
        0x47a, 0x486, 0x48c, 0x498, 0x49e, 0x4b0, 0x4bc, 0x4c2, 0x4c4, 0x4c8, 0x4ce, 0x4d0, 0x4dc,
        0x4e6, 0x4ec, 0x4f2, 0x4f4, 0x50c, 0x518, 0x51e, 0x530, 0x53c, 0x578, 0x584, 0x588, 0x58e,
        0x590, 0x59c, 0x5b8, 0x5c6, 0x5cc, 0x5d8, 0x5de, 0x5e2, 0x5e4, 0x5e8, 0x5ee, 0x612, 0x614,
        0x622, 0x624, 0x628, 0x62e, 0x636, 0x63a, 0x642, 0x644, 0x648, 0x64e, 0x650, 0x65c, 0x666,
        0x66c, 0x672, 0x674, 0x684, 0x688, 0x68e, 0x690, 0x69c, 0x6b8, 0x6c6, 0x6cc, 0x6d8, 0x6de,
        0x6e2, 0x6e4, 0x6e8, 0x6ee, 0x6f6, 0x716, 0x71a, 0x726, 0x72c, 0x732, 0x734, 0x746, 0x74c,
        0x758, 0x75e, 0x762, 0x764, 0x768, 0x76e, 0x776, 0x77a, 0x78a, 0x792, 0x794, 0x7a2, 0x7a4,
        0x7a8, 0x7ae, 0x7b6, 0x7ba, 0x18eb,
    ];
    const PATTERN_INDEX: [u8; 109] = [
        0x44, 0x43, 0x4a, 0x49, 0x23, 0x05, 0x22, 0x5e, 0x26, 0x08, 0x25, 0x2c, 0x2f, 0x4f, 0x42,
        0x04, 0x03, 0x52, 0x41, 0x51, 0x48, 0x07, 0x06, 0x0e, 0x47, 0x0d, 0x11, 0x10, 0x55, 0x54,
        0x40, 0x21, 0x5d, 0x3f, 0x50, 0x5c, 0x46, 0x24, 0x2b, 0x45, 0x0c, 0x2a, 0x2e, 0x0f, 0x2d,
        0x63, 0x60, 0x53, 0x5f, 0x64, 0x4b, 0x4e, 0x29, 0x0b, 0x28, 0x32, 0x20, 0x6a, 0x3d, 0x0a,
        0x09, 0x14, 0x4c, 0x13, 0x02, 0x01, 0x12, 0x16, 0x67, 0x27, 0x31, 0x68, 0x69, 0x6b, 0x1f,
        0x00, 0x1e, 0x59, 0x34, 0x15, 0x33, 0x35, 0x5a, 0x38, 0x3b, 0x1a, 0x19, 0x1d, 0x1c, 0x37,
        0x18, 0x36, 0x65, 0x3a, 0x1b, 0x39, 0x17, 0x30, 0x3c, 0x3e, 0x58, 0x57, 0x62, 0x56, 0x61,
        0x66, 0x5b, 0x4d, 0x6c,
    ];
    PATTERN_REVERSE
        .binary_search(&pattern)
        .map_err(|_| DecodingError::Pattern(pattern))
        .map(|i| PATTERN_INDEX[i])
}

fn bars_to_pattern(bars: &[Bar]) -> Result<u16, DecodingError> {
    let mut result = 0;
    for bar in bars {
        if !(1..=4).contains(&bar.width) || bar.space > 4 {
            return Err(DecodingError::InvalidBars);
        }
        result = (result << bar.width) | ((1 << bar.width) - 1);
        result <<= bar.space;
    }
    Ok(result)
}

fn decode_symbols(bars: &[Bar]) -> Result<Vec<u8>, DecodingError> {
    if bars.len() < 3 + 3 + 4 {
        return Err(DecodingError::Short);
    }
    let (init, stop) = bars.split_at(bars.len() - 4);

    if bars_to_pattern(stop)? != crate::encode::PATTERNS[crate::STOP as usize] {
        return Err(DecodingError::WrongStop);
    }

    let (data, checksum) = init.split_at(init.len() - 3);

    if data.len() % 3 != 0 {
        return Err(DecodingError::Length);
    }

    let checksum = lookup(bars_to_pattern(checksum)?)?;
    let result = data
        .chunks_exact(3)
        .map(|chunk| lookup(bars_to_pattern(chunk)?))
        .collect::<Result<Vec<u8>, _>>()?;
    if checksum != crate::checksum(result.iter().cloned()) {
        return Err(DecodingError::Checksum);
    }
    Ok(result)
}

// Code set A minus control characters, which AI data never contains.
fn decode_a(ch: u8) -> Result<u8, DecodingError> {
    match ch {
        0..=0x3F => Ok(ch + b' '),
        _ => Err(DecodingError::Unexpected(ch)),
    }
}

fn decode_b(ch: u8) -> Result<u8, DecodingError> {
    match ch {
        0..=0x5F => Ok(ch + b' '),
        _ => Err(DecodingError::Unexpected(ch)),
    }
}

/// Decode the bars of a GS1-128 symbol into canonical AI data.
///
/// FNC1 is decoded as `^`. The data is not validated, see
/// [AiParser::parse_gs1_128] for that.
pub fn decode(bars: &[Bar]) -> Result<String, DecodingError> {
    #[derive(Clone, Copy, Debug)]
    enum Mode {
        A,
        B,
        C,
    }

    let symbols = decode_symbols(bars)?;
    let mut symbols = symbols.iter().cloned().peekable();
    let mut mode = match symbols.next() {
        Some(crate::START_A) => Mode::A,
        Some(crate::START_B) => Mode::B,
        Some(crate::START_C) => Mode::C,
        _ => return Err(DecodingError::NoMode),
    };
    if symbols.peek() != Some(&crate::FNC1_SYMBOL) {
        return Err(DecodingError::NoFnc1);
    }

    let mut data = String::with_capacity(2 * symbols.len());
    let mut shift_back = None;
    while let Some(ch) = symbols.next() {
        let current = mode;
        if let Some(back) = shift_back.take() {
            mode = back;
        }
        match (current, ch) {
            (_, crate::FNC1_SYMBOL) => data.push(FNC1 as char),
            (Mode::A, crate::SHIFT_MODE) => {
                mode = Mode::B;
                shift_back = Some(Mode::A);
            }
            (Mode::B, crate::SHIFT_MODE) => {
                mode = Mode::A;
                shift_back = Some(Mode::B);
            }
            (Mode::B | Mode::C, crate::SWITCH_A) => mode = Mode::A,
            (Mode::A | Mode::C, crate::SWITCH_B) => mode = Mode::B,
            (Mode::A | Mode::B, crate::SWITCH_C) => mode = Mode::C,
            (Mode::A | Mode::B, ch) => {
                let c = match current {
                    Mode::A => decode_a(ch)?,
                    _ => decode_b(ch)?,
                };
                // a data character must not pass for FNC1
                if c == FNC1 {
                    return Err(DecodingError::Unexpected(ch));
                }
                data.push(c as char);
            }
            (Mode::C, ch @ 0..=99) => {
                data.push((ch / 10 + b'0') as char);
                data.push((ch % 10 + b'0') as char);
            }
            (Mode::C, ch) => return Err(DecodingError::Unexpected(ch)),
        }
    }
    Ok(data)
}

impl AiParser {
    /// Decode the bars of a GS1-128 symbol and validate the AI data it
    /// carries.
    pub fn parse_gs1_128(&self, bars: &[Bar]) -> Result<AiData, DecodingError> {
        let data = decode(bars)?;
        log::debug!("Decoded GS1-128: {}", data);
        Ok(self.parse_unbracketed(&data)?)
    }
}

#[cfg(test)]
use crate::std::vec;
#[cfg(test)]
use crate::Gs1_128;

#[cfg(test)]
fn bars_of(indices: &[u8]) -> Vec<Bar> {
    let mut indices = indices.to_vec();
    indices.push(crate::checksum(indices.iter().cloned()));
    indices.push(crate::STOP);
    indices
        .iter()
        .flat_map(|idx| crate::encode::bits_to_bars(crate::encode::PATTERNS[*idx as usize]))
        .collect()
}

#[test]
fn test_bars_to_pattern() {
    assert_eq!(bars_to_pattern(&[Bar { width: 2, space: 0 }]), Ok(0b11));
    assert_eq!(
        bars_to_pattern(&[
            Bar { width: 2, space: 1 },
            Bar { width: 1, space: 2 },
            Bar { width: 3, space: 2 },
        ]),
        Ok(0b11010011100),
    );
    assert_eq!(
        bars_to_pattern(&[Bar { width: 5, space: 1 }]),
        Err(DecodingError::InvalidBars)
    );

    for pattern in crate::encode::PATTERNS {
        let bars = crate::encode::bits_to_bars(pattern);
        assert_eq!(bars_to_pattern(&bars), Ok(pattern));
    }
}

#[test]
fn test_decode() {
    let data = AiData::parse_bracketed("(01)12345678901231(10)ABC123(21)XYZ").unwrap();
    let bars: Vec<Bar> = Gs1_128::encode(&data).bars().collect();
    assert_eq!(decode(&bars).as_deref(), Ok("^011234567890123110ABC123^21XYZ"));
    assert_eq!(AiParser::default().parse_gs1_128(&bars), Ok(data));
}

#[test]
fn test_decode_code_set_a() {
    let bars = bars_of(&[
        crate::START_A,
        crate::FNC1_SYMBOL,
        b'9' - b' ',
        b'9' - b' ',
        b'A' - b' ',
        crate::SHIFT_MODE,
        b'b' - b' ',
        b'C' - b' ',
    ]);
    assert_eq!(decode(&bars).as_deref(), Ok("^99AbC"));
}

#[test]
fn test_decode_errors() {
    let plain = bars_of(&[crate::START_B, b'A' - b' ']);
    assert_eq!(decode(&plain), Err(DecodingError::NoFnc1));

    let fnc4 = bars_of(&[crate::START_B, crate::FNC1_SYMBOL, crate::SWITCH_B]);
    assert_eq!(decode(&fnc4), Err(DecodingError::Unexpected(crate::SWITCH_B)));

    let mut bars = bars_of(&[crate::START_C, crate::FNC1_SYMBOL, 1]);
    assert_eq!(decode(&bars[..4]), Err(DecodingError::Short));
    bars[3].width = 1;
    assert!(decode(&bars).is_err());

    let caret = FNC1 - b' ';
    let mut indices = vec![crate::START_B, crate::FNC1_SYMBOL];
    indices.extend(b"10AB".iter().map(|c| c - b' '));
    indices.push(caret);
    indices.extend(b"99X".iter().map(|c| c - b' '));
    let literal_caret = bars_of(&indices);
    assert_eq!(decode(&literal_caret), Err(DecodingError::Unexpected(caret)));
    assert_eq!(
        AiParser::default().parse_gs1_128(&literal_caret),
        Err(DecodingError::Unexpected(caret))
    );
    let caret_in_a = bars_of(&[crate::START_A, crate::FNC1_SYMBOL, caret]);
    assert_eq!(decode(&caret_in_a), Err(DecodingError::Unexpected(caret)));

    let invalid = bars_of(&[crate::START_C, crate::FNC1_SYMBOL, 1, 12]);
    assert_eq!(
        AiParser::default().parse_gs1_128(&invalid),
        Err(DecodingError::Syntax(SyntaxError::DataTooShort("01".into())))
    );
}

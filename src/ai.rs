//! Bracketed and unbracketed AI syntax.
//!
//! Both syntaxes are parsed into the canonical unbracketed form: FNC1 in
//! first position, followed by AI/value pairs where any value whose AI is not
//! of predefined length is terminated by FNC1 when another AI follows. FNC1 is
//! represented by [FNC1](crate::FNC1).

use crate::std::borrow::Cow;
use crate::std::string::{String, ToString};
use crate::std::vec::Vec;

use crate::table::{
    is_fnc1_required, length_by_prefix, AiEntry, AI_TABLE, UNKNOWN_AI, UNKNOWN_AI2, UNKNOWN_AI3,
    UNKNOWN_AI4,
};
use crate::{AiData, AiValue, SyntaxError, FNC1, MAX_AIS, MAX_DATA};

/// Find the table entry for an AI.
///
/// With `ai_len` of zero the AI is the entry that is a prefix of `data`.
/// Otherwise the AI is the first `ai_len` characters of `data` and must match
/// an entry exactly.
///
/// With `permit_unknown` an AI that is not in the table is vivified as one of
/// the placeholder entries, unless that would contradict the AI length
/// defined for its two digit prefix or shadow a known AI.
pub(crate) fn lookup(data: &[u8], ai_len: usize, permit_unknown: bool) -> Option<&'static AiEntry> {
    if ai_len == 1 || ai_len > data.len() {
        return None;
    }

    for entry in AI_TABLE {
        let ai = entry.ai.as_bytes();
        if data.starts_with(ai) {
            if ai_len != 0 && ai.len() != ai_len {
                return None;
            }
            return Some(entry);
        }
        // never vivify an AI that is a prefix of a known AI
        if ai_len != 0 && ai.starts_with(&data[..ai_len]) {
            return None;
        }
    }

    if !permit_unknown {
        return None;
    }

    let by_prefix = data
        .get(..2)
        .and_then(|prefix| core::str::from_utf8(prefix).ok())
        .and_then(length_by_prefix);
    match by_prefix {
        Some(len) if ai_len != 0 && len as usize != ai_len => None,
        Some(2) => Some(&UNKNOWN_AI2),
        Some(3) => Some(&UNKNOWN_AI3),
        Some(4) => Some(&UNKNOWN_AI4),
        _ => Some(&UNKNOWN_AI),
    }
}

/// Check the overall length of a value and that it does not contain FNC1.
///
/// Run before the component checks so that a value that is too long is
/// reported as such rather than as, say, a bad check digit.
pub fn check_value_shape(entry: &AiEntry, ai: &str, value: &str) -> Result<(), SyntaxError> {
    if value.len() < entry.min_len() {
        return Err(SyntaxError::ValueTooShort(ai.to_string()));
    }
    if value.len() > entry.max_len() {
        return Err(SyntaxError::ValueTooLong(ai.to_string()));
    }
    if value.bytes().any(|c| c == FNC1) {
        return Err(SyntaxError::IllegalFnc1(ai.to_string()));
    }
    Ok(())
}

/// Validate the components of an AI at the start of `value`.
///
/// Each component takes as many characters as it may, so for AIs of
/// predefined length less than all of `value` may be consumed. Returns the
/// number of characters consumed.
pub(crate) fn validate_components(
    entry: &AiEntry,
    ai: &str,
    value: &[u8],
) -> Result<usize, SyntaxError> {
    log::trace!("  Considering AI ({}): {} characters", ai, value.len());

    if value.is_empty() {
        return Err(SyntaxError::DataEmpty(ai.to_string()));
    }

    let mut rest = value;
    for part in entry.components {
        let (component, tail) = rest.split_at(rest.len().min(part.max as usize));
        log::trace!("    Validating component: {}", String::from_utf8_lossy(component));

        if component.len() < part.min as usize {
            return Err(SyntaxError::DataTooShort(ai.to_string()));
        }
        part.cset.lint(ai, component)?;
        for linter in part.linters {
            linter.lint(ai, component)?;
        }
        rest = tail;
    }

    Ok(value.len() - rest.len())
}

fn write(data: &mut String, s: &str) -> Result<(), SyntaxError> {
    if data.len() + s.len() > MAX_DATA {
        return Err(SyntaxError::DataCapacity);
    }
    data.push_str(s);
    Ok(())
}

pub(crate) fn push_ai(ais: &mut Vec<AiValue>, ai: AiValue) -> Result<(), SyntaxError> {
    if ais.len() >= MAX_AIS {
        return Err(SyntaxError::TooManyAis);
    }
    ais.push(ai);
    Ok(())
}

/// Incrementally builds canonical AI data from individual AI/value pairs.
///
/// Used by every syntax that yields AIs one by one: bracketed data and
/// Digital Link URIs.
pub(crate) struct Builder {
    data: String,
    ais: Vec<AiValue>,
    fnc1_required: bool,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            data: String::new(),
            ais: Vec::new(),
            fnc1_required: true,
        }
    }

    /// Write the AI, and FNC1 before it if the previous AI requires one.
    ///
    /// Returns the span of the AI.
    pub(crate) fn push_ai(&mut self, ai: &str) -> Result<core::ops::Range<usize>, SyntaxError> {
        if self.fnc1_required {
            write(&mut self.data, "^")?;
        }
        let start = self.data.len();
        write(&mut self.data, ai)?;
        self.fnc1_required = is_fnc1_required(ai);
        Ok(start..self.data.len())
    }

    /// Append a fragment of the current value.
    pub(crate) fn push_value(&mut self, value: &str) -> Result<(), SyntaxError> {
        write(&mut self.data, value)
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Check the value written since `value_start` and record the AI.
    pub(crate) fn finish_ai(
        &mut self,
        entry: &'static AiEntry,
        ai: core::ops::Range<usize>,
        value_start: usize,
    ) -> Result<(), SyntaxError> {
        let value = value_start..self.data.len();
        let label = &self.data[ai.clone()];
        if value.is_empty() {
            return Err(SyntaxError::DataEmpty(label.to_string()));
        }
        check_value_shape(entry, label, &self.data[value.clone()])?;
        log::trace!("    Extracted: ({}) {}", label, &self.data[value.clone()]);
        push_ai(&mut self.ais, AiValue { entry, ai, value })
    }

    /// Validate the complete canonical data.
    pub(crate) fn finish(self, permit_unknown: bool) -> Result<AiData, SyntaxError> {
        process(&self.data, false, permit_unknown)?;
        Ok(AiData {
            data: self.data,
            ais: self.ais,
        })
    }
}

/// Convert bracketed AI syntax, `(01)12345678901231(10)ABC`, to canonical
/// form. A literal `(` in a value is written `\(`.
pub(crate) fn parse_bracketed(input: &str, permit_unknown: bool) -> Result<AiData, SyntaxError> {
    log::debug!("Parsing AI data: {}", input);
    let result = parse_bracketed_ais(input, permit_unknown);
    match &result {
        Ok(data) => log::debug!("Parsing AI data successful: {}", data.as_str()),
        Err(err) => log::debug!("Parsing AI data failed: {:?}", err),
    }
    result
}

fn parse_bracketed_ais(input: &str, permit_unknown: bool) -> Result<AiData, SyntaxError> {
    if input.is_empty() {
        return Err(SyntaxError::EmptyBracketed);
    }

    let mut builder = Builder::new();
    let mut rest = input;
    while !rest.is_empty() {
        let after = rest.strip_prefix('(').ok_or(SyntaxError::MissingBracket)?;
        let close = after.find(')').ok_or(SyntaxError::UnterminatedAi)?;
        let ai = &after[..close];

        if !(2..=4).contains(&ai.len()) {
            return Err(SyntaxError::AiLength(ai.to_string()));
        }
        let entry = ai
            .bytes()
            .all(|c| c.is_ascii_digit())
            .then(|| lookup(after.as_bytes(), ai.len(), permit_unknown))
            .flatten()
            .ok_or_else(|| SyntaxError::UnrecognisedAi(ai.to_string()))?;

        let ai_span = builder.push_ai(ai)?;
        let value_start = builder.len();

        // the value runs up to the next unescaped bracket
        let value = &after[close + 1..];
        let bytes = value.as_bytes();
        let (mut i, mut from) = (0, 0);
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if bytes.get(i + 1) == Some(&b'(') => {
                    builder.push_value(&value[from..i])?;
                    builder.push_value("(")?;
                    i += 2;
                    from = i;
                }
                b'(' => break,
                _ => i += 1,
            }
        }
        builder.push_value(&value[from..i])?;
        rest = &value[i..];

        builder.finish_ai(entry, ai_span, value_start)?;
    }

    builder.finish(permit_unknown)
}

fn preview(data: &[u8]) -> String {
    String::from_utf8_lossy(&data[..data.len().min(4)]).into_owned()
}

/// Validate canonical AI data, extracting the AIs if `extract` is set.
///
/// The returned list is empty unless `extract` is set.
pub(crate) fn process(
    data: &str,
    extract: bool,
    permit_unknown: bool,
) -> Result<Vec<AiValue>, SyntaxError> {
    let bytes = data.as_bytes();
    let mut ais = Vec::new();

    if bytes.len() > MAX_DATA {
        return Err(SyntaxError::DataCapacity);
    }
    if bytes.first() != Some(&FNC1) {
        return Err(SyntaxError::MissingFnc1);
    }
    if bytes.len() == 1 {
        return Err(SyntaxError::EmptyData);
    }

    let mut p = 1;
    while p < bytes.len() {
        // Unknown AIs of unknown length cannot be extracted since we could
        // not tell where the AI ends and the value begins.
        let entry = match lookup(&bytes[p..], 0, permit_unknown) {
            Some(entry) if extract && entry.ai.is_empty() => None,
            Some(entry) if p + entry.ai.len() > bytes.len() => None,
            Some(entry) if entry.is_unknown() => bytes[p..p + entry.ai.len()]
                .iter()
                .all(u8::is_ascii_digit)
                .then_some(entry),
            entry => entry,
        }
        .ok_or_else(|| SyntaxError::NoAiPrefix(preview(&bytes[p..])))?;

        let ai = p..p + entry.ai.len();
        let label: Cow<'_, str> = String::from_utf8_lossy(&bytes[ai.clone()]);
        p = ai.end;

        let end = bytes[p..]
            .iter()
            .position(|&c| c == FNC1)
            .map_or(bytes.len(), |i| p + i);

        let consumed = validate_components(entry, &label, &bytes[p..end])?;
        if extract {
            let value = p..p + consumed;
            push_ai(&mut ais, AiValue { entry, ai, value })?;
        }
        p += consumed;

        // after AIs requiring FNC1 there must be FNC1 or the end of the data
        if entry.fnc1 && p < bytes.len() && bytes[p] != FNC1 {
            return Err(SyntaxError::DataTooLong(label.into_owned()));
        }
        // a superfluous FNC1 after a fixed-length AI is tolerated
        if bytes.get(p) == Some(&FNC1) {
            p += 1;
        }
    }

    Ok(ais)
}

#[cfg(test)]
fn lookup_ai(data: &str, ai_len: usize, permit_unknown: bool) -> Option<&'static str> {
    lookup(data.as_bytes(), ai_len, permit_unknown).map(|entry| entry.ai)
}

#[test]
fn test_lookup() {
    assert_eq!(lookup_ai("01", 2, false), Some("01"));
    assert_eq!(lookup_ai("011234", 2, false), Some("01"));
    assert_eq!(lookup_ai("011234", 0, false), Some("01"));
    assert_eq!(lookup_ai("8012", 0, false), Some("8012"));

    assert_eq!(lookup_ai("2345XX", 4, false), None);
    assert_eq!(lookup_ai("234XXX", 3, false), None);
    assert_eq!(lookup_ai("23XXXX", 2, false), None);
    assert_eq!(lookup_ai("2XXXXX", 1, false), None);
    assert_eq!(lookup_ai("XXXXXX", 0, false), None);
    assert_eq!(lookup_ai("234567", 0, false), None);

    assert_eq!(lookup_ai("235XXX", 0, false), Some("235"));
    assert_eq!(lookup_ai("235XXX", 2, false), None);
    assert_eq!(lookup_ai("235XXX", 1, false), None);

    assert_eq!(lookup_ai("37123", 2, false), Some("37"));
    assert_eq!(lookup_ai("37123", 3, false), None);
    assert_eq!(lookup_ai("37123", 1, false), None);

    assert_eq!(lookup_ai("01", 3, false), None);
}

#[test]
fn test_lookup_vivify() {
    assert!(core::ptr::eq(lookup(b"89", 2, true).unwrap(), &UNKNOWN_AI));
    assert_eq!(lookup_ai("89", 2, false), None);

    // known AIs shadow vivification
    assert_eq!(lookup_ai("011", 3, true), None);
    assert_eq!(lookup_ai("800", 3, true), None);
    assert_eq!(lookup_ai("80", 2, true), None);

    // the length defined for the prefix must agree
    assert_eq!(lookup_ai("399", 3, true), None);
    assert!(core::ptr::eq(lookup(b"3999", 4, true).unwrap(), &UNKNOWN_AI4));
    assert_eq!(lookup_ai("2367", 4, true), None);
    assert!(core::ptr::eq(lookup(b"236", 3, true).unwrap(), &UNKNOWN_AI3));

    assert!(core::ptr::eq(lookup(b"891234", 0, true).unwrap(), &UNKNOWN_AI));
    assert!(core::ptr::eq(lookup(b"2361234", 0, true).unwrap(), &UNKNOWN_AI3));
}

#[cfg(test)]
fn parse(input: &str) -> Result<String, SyntaxError> {
    parse_bracketed(input, false).map(|data| data.as_str().into())
}

#[test]
fn test_parse_bracketed() {
    assert_eq!(parse("(01)12345678901231").as_deref(), Ok("^0112345678901231"));
    assert_eq!(parse("(10)12345").as_deref(), Ok("^1012345"));
    assert_eq!(
        parse("(01)12345678901231(10)12345").as_deref(),
        Ok("^01123456789012311012345")
    );
    assert_eq!(parse("(3100)123456(10)12345").as_deref(), Ok("^31001234561012345"));
    assert_eq!(parse("(10)12345(11)991225").as_deref(), Ok("^1012345^11991225"));
    assert_eq!(parse("(3900)12345(11)991225").as_deref(), Ok("^390012345^11991225"));
    assert_eq!(parse("(10)12345\\(11)991225").as_deref(), Ok("^1012345(11)991225"));
    assert_eq!(parse("(10)12345\\(").as_deref(), Ok("^1012345("));
    assert_eq!(parse("(10)AB\\C").as_deref(), Err(&SyntaxError::Cset82("10".into())));
    assert_eq!(
        parse("(8013)1987654Ad4X4bL5ttr2310c2K").as_deref(),
        Ok("^80131987654Ad4X4bL5ttr2310c2K")
    );
}

#[test]
fn test_parse_bracketed_errors() {
    use SyntaxError::*;
    assert_eq!(parse(""), Err(EmptyBracketed));
    assert_eq!(parse("").unwrap_err().kind(), crate::ErrorKind::Structural);
    assert_eq!(parse("(10)(11)98765"), Err(DataEmpty("10".into())));
    assert_eq!(parse("(10)12345(11)"), Err(DataEmpty("11".into())));
    assert_eq!(parse("(1A)12345"), Err(UnrecognisedAi("1A".into())));
    assert_eq!(parse("1(12345"), Err(MissingBracket));
    assert_eq!(parse("12345"), Err(MissingBracket));
    assert_eq!(parse("()12345"), Err(AiLength("".into())));
    assert_eq!(parse("(1)12345"), Err(AiLength("1".into())));
    assert_eq!(parse("(12345)12345"), Err(AiLength("12345".into())));
    assert_eq!(parse("(15"), Err(UnterminatedAi));
    assert_eq!(parse("(1"), Err(UnterminatedAi));
    assert_eq!(parse("("), Err(UnterminatedAi));
    assert_eq!(parse("(89)ABC"), Err(UnrecognisedAi("89".into())));
    assert_eq!(
        parse("(01)123456789012312(10)12345"),
        Err(ValueTooLong("01".into()))
    );
    assert_eq!(parse("(10)12345^"), Err(IllegalFnc1("10".into())));
    assert_eq!(parse("(17)9(90)217"), Err(ValueTooShort("17".into())));
    assert_eq!(
        parse("(8013)1987654Ad4X4bL5ttr2310cXK"),
        Err(CheckPair("8013".into()))
    );
    assert_eq!(parse("(01)12345678901234"), Err(CheckDigit("01".into())));
}

#[test]
fn test_parse_bracketed_spans() {
    let data = parse_bracketed("(01)12345678901231(10)AB\\(C(3103)000195", false).unwrap();
    assert_eq!(data.as_str(), "^011234567890123110AB(C^3103000195");
    let ais: Vec<_> = data.ais().map(|ai| (ai.ai, ai.value)).collect();
    assert_eq!(
        ais,
        [("01", "12345678901231"), ("10", "AB(C"), ("3103", "000195")]
    );
}

#[test]
fn test_parse_bracketed_unknown() {
    let data = parse_bracketed("(89)ABC(99)X", true).unwrap();
    assert_eq!(data.as_str(), "^89ABC^99X");
    let first = data.ais().next().unwrap();
    assert!(first.entry.is_unknown());
    assert_eq!((first.ai, first.value), ("89", "ABC"));
}

#[test]
fn test_parse_bracketed_capacity() {
    let mut input = String::new();
    for _ in 0..MAX_AIS {
        input.push_str("(99)A");
    }
    assert!(parse(&input).is_ok());
    input.push_str("(99)A");
    assert_eq!(parse(&input), Err(SyntaxError::TooManyAis));

    // the buffer limit is hit while writing, before the value is checked
    let mut input = String::from("(91)");
    input.push_str(&"A".repeat(MAX_DATA));
    assert_eq!(parse(&input), Err(SyntaxError::DataCapacity));
    assert_eq!(
        process(&input.replace("(91)", "^91"), false, false),
        Err(SyntaxError::DataCapacity)
    );
}

#[cfg(test)]
fn extract(data: &str) -> Result<usize, SyntaxError> {
    process(data, true, false).map(|ais| ais.len())
}

#[test]
fn test_process() {
    use SyntaxError::*;
    let ok = |data: &str| assert!(extract(data).is_ok(), "{}", data);
    let fail = |data: &str| assert!(extract(data).is_err(), "{}", data);

    assert_eq!(extract(""), Err(MissingFnc1));
    assert_eq!(extract("991234"), Err(MissingFnc1));
    assert_eq!(extract("^"), Err(EmptyData));
    assert_eq!(extract("^891234"), Err(NoAiPrefix("8912".into())));

    ok("^991234");
    assert_eq!(extract("^99~ABC"), Err(Cset82("99".into())));
    fail("^99ABC~");

    ok("^0112345678901231");
    assert_eq!(extract("^01A2345678901231"), Err(NonDigit("01".into())));
    fail("^011234567890123A");
    assert_eq!(extract("^0112345678901234"), Err(CheckDigit("01".into())));
    assert_eq!(extract("^011234567890123"), Err(DataTooShort("01".into())));
    assert_eq!(extract("^01123456789012312"), Err(NoAiPrefix("2".into())));

    ok("^0112345678901231^");
    fail("^011234567890123^");
    fail("^01123456789012345^");
    fail("^01123456789012345^991234");

    assert_eq!(extract("^0112345678901231991234"), Ok(2));
    assert_eq!(extract("^0112345678901231^991234"), Ok(2));

    ok("^2421");
    ok("^24212");
    ok("^242123");
    ok("^2421234");
    ok("^24212345");
    ok("^242123456");
    assert_eq!(extract("^242123456^10ABC123"), Ok(2));
    ok("^242123456^");
    assert_eq!(extract("^2421234567"), Err(DataTooLong("242".into())));

    ok("^81111234");
    fail("^8111123");
    fail("^811112345");
    ok("^81111234^10ABC123");

    ok("^800112341234512398");
    fail("^80011234123451239");
    fail("^8001123412345123981");
    ok("^800112341234512398^0112345678901231");
    fail("^80011234123451239^0112345678901231");
    fail("^8001123412345123981^01123456789012312");

    ok("^800302112345678900ABC");
    assert_eq!(extract("^800302112345678901ABC"), Err(CheckDigit("8003".into())));
    ok("^800302112345678900");
    ok("^800302112345678900^10ABC123");
    ok("^800302112345678900ABCDEFGHIJKLMNOP");
    fail("^800302112345678900ABCDEFGHIJKLMNOPQ");

    ok("^7230121234567890123456789012345678");
    fail("^72301212345678901234567890123456789");
    ok("^7230123");
    fail("^723012");

    ok("^8010#-/0123ABC");
    assert_eq!(extract("^8010abc"), Err(Cset39("8010".into())));
}

#[test]
fn test_process_unknown() {
    // an AI of unknown length can be validated but not extracted
    assert_eq!(
        process("^891234", true, true),
        Err(SyntaxError::NoAiPrefix("8912".into()))
    );
    assert_eq!(process("^891234", false, true), Ok(Vec::new()));

    let ais = process("^2361234^99A", true, true).unwrap();
    assert_eq!(ais.len(), 2);
    assert!(ais[0].entry.is_unknown());
    assert_eq!((ais[0].ai.clone(), ais[0].value.clone()), (1..4, 4..8));

    assert_eq!(
        process("^39AB12", false, true),
        Err(SyntaxError::NoAiPrefix("39AB".into()))
    );
    assert_eq!(process("^23", false, true), Err(SyntaxError::NoAiPrefix("23".into())));
}

#[test]
fn test_round_trip_validates() {
    for input in [
        "(01)12345678901231(10)12345",
        "(10)12345\\(11)991225",
        "(3900)12345(11)991225",
        "(8003)02112345678900ABC(21)A\\(B",
    ] {
        let data = parse_bracketed(input, false).unwrap();
        let ais = process(data.as_str(), true, false).unwrap();
        assert_eq!(ais, data.ais);
    }
}

//! GS1 Digital Link URIs.
//!
//! Only the AIs are extracted, from the path info and the query parameters.
//! The structure of the URI beyond that is not checked, nor are the
//! relationships between the extracted AIs.

use crate::std::string::{String, ToString};
use crate::std::vec::Vec;

use percent_encoding::percent_decode;

use crate::ai::Builder;
use crate::{ai, AiData, AiEntry, AiParser, SyntaxError, MAX_AI_LEN};

const URI_CHARACTERS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~:/?#[]@!$&'()*+,;=%";

/// AIs that may start the Digital Link path info.
const PRIMARY_KEYS: [&str; 15] = [
    "00", "01", "253", "255", "401", "402", "414", "417", "8003", "8004", "8006", "8010", "8013",
    "8017", "8018",
];

/// Reverse percent encoding.
///
/// A `%` not followed by two hex digits is kept as is.
pub(crate) fn uri_unescape(input: &[u8]) -> Vec<u8> {
    percent_decode(input).collect()
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit())
}

impl AiParser {
    /// Extract the AI data from a GS1 Digital Link URI.
    ///
    /// ```
    /// # use gs1_encoders::AiParser;
    /// let data = AiParser::default()
    ///     .parse_dl_uri("https://id.gs1.org/01/09520123456788/10/ABC1?17=180426")
    ///     .unwrap();
    /// assert_eq!(data.as_str(), "^010952012345678810ABC1^17180426");
    /// ```
    pub fn parse_dl_uri(&self, uri: &str) -> Result<AiData, SyntaxError> {
        log::debug!("Parsing DL data: {}", uri);
        let result = self.parse_dl(uri);
        match &result {
            Ok(data) => log::debug!("Parsing DL data successful: {}", data.as_str()),
            Err(err) => log::debug!("Parsing DL data failed: {:?}", err),
        }
        result
    }

    fn dl_lookup(&self, ai: &str) -> Option<&'static AiEntry> {
        if !is_numeric(ai) {
            return None;
        }
        ai::lookup(ai.as_bytes(), ai.len(), self.permit_unknown_ais)
    }

    fn parse_dl(&self, uri: &str) -> Result<AiData, SyntaxError> {
        if !uri.bytes().all(|c| URI_CHARACTERS.contains(&c)) {
            return Err(SyntaxError::UriCharacters);
        }

        let rest = uri
            .strip_prefix("https://")
            .or_else(|| uri.strip_prefix("http://"))
            .ok_or(SyntaxError::UriScheme)?;

        let path_info = match rest.find('/') {
            Some(domain_end) if domain_end > 0 => {
                log::trace!("  Domain: {}", &rest[..domain_end]);
                &rest[domain_end..]
            }
            _ => return Err(SyntaxError::UriPathInfo),
        };

        let (path_info, query) = match path_info.split_once('?') {
            Some((path_info, query)) => {
                let query = query.split_once('#').map_or(query, |(query, _)| query);
                (path_info, Some(query))
            }
            None => (path_info, None),
        };
        log::trace!("  Path info: {}", path_info);

        let dl_path = self.find_dl_path(path_info)?;
        log::trace!("  Stem: {}", &path_info[..path_info.len() - dl_path.len()]);

        let mut builder = Builder::new();

        let mut segments = dl_path[1..].split('/');
        while let (Some(ai), Some(value)) = (segments.next(), segments.next()) {
            let entry = self
                .dl_lookup(ai)
                .ok_or_else(|| SyntaxError::UnrecognisedAi(ai.to_string()))?;
            push_dl_ai(&mut builder, entry, ai, value)?;
        }

        for param in query.into_iter().flat_map(|query| query.split('&')) {
            let Some((ai, value)) = param.split_once('=') else {
                if !param.is_empty() {
                    log::trace!("    Skipped singleton: {}", param);
                }
                continue;
            };
            if !is_numeric(ai) {
                log::trace!("    Skipped: {}", param);
                continue;
            }
            let entry = self
                .dl_lookup(ai)
                .ok_or_else(|| SyntaxError::UnknownQueryAi(ai.to_string()))?;
            push_dl_ai(&mut builder, entry, ai, value)?;
        }

        builder.finish(self.permit_unknown_ais)
    }

    /// Search the path info backwards for the rightmost `/AI/value` pair
    /// whose AI is a primary key, stepping only over pairs of known AIs.
    ///
    /// Returns the path info from that pair on.
    fn find_dl_path<'a>(&self, path_info: &'a str) -> Result<&'a str, SyntaxError> {
        let mut end = path_info.len();
        while let Some(value_sep) = path_info[..end].rfind('/') {
            let Some(ai_sep) = path_info[..value_sep].rfind('/') else {
                break;
            };
            let ai = &path_info[ai_sep + 1..value_sep];
            let Some(entry) = self.dl_lookup(ai) else {
                break;
            };
            if PRIMARY_KEYS.contains(&entry.ai) {
                return Ok(&path_info[ai_sep..]);
            }
            end = ai_sep;
        }
        Err(SyntaxError::NoDlKey)
    }
}

fn push_dl_ai(
    builder: &mut Builder,
    entry: &'static AiEntry,
    ai: &str,
    raw: &str,
) -> Result<(), SyntaxError> {
    let mut value = uri_unescape(raw.as_bytes());
    if value.is_empty() || value.len() > MAX_AI_LEN {
        return Err(SyntaxError::DlValue(ai.to_string()));
    }

    // GTIN-8, GTIN-12 and GTIN-13 are padded to GTIN-14
    if entry.ai == "01" && matches!(value.len(), 8 | 12 | 13) {
        let pad = 14 - value.len();
        value.resize(14, b'0');
        value.rotate_right(pad);
    }

    let value = String::from_utf8(value).map_err(|_| SyntaxError::Cset82(ai.to_string()))?;
    log::trace!("    Extracted: ({}) {}", ai, value);

    let ai_span = builder.push_ai(ai)?;
    let value_start = builder.len();
    builder.push_value(&value)?;
    builder.finish_ai(entry, ai_span, value_start)
}

#[cfg(test)]
fn parse(uri: &str) -> Result<String, SyntaxError> {
    AiParser::default()
        .parse_dl_uri(uri)
        .map(|data| data.as_str().to_string())
}

#[test]
fn test_uri_unescape() {
    let unescape = |s: &str| uri_unescape(s.as_bytes());
    assert_eq!(unescape(""), b"");
    assert_eq!(unescape("test"), b"test");
    assert_eq!(unescape("%20"), b" ");
    assert_eq!(unescape("%20AB"), b" AB");
    assert_eq!(unescape("A%20B"), b"A B");
    assert_eq!(unescape("AB%20"), b"AB ");
    assert_eq!(unescape("ABC%2"), b"ABC%2");
    assert_eq!(unescape("ABCD%"), b"ABCD%");
    assert_eq!(unescape("A%20%20B"), b"A  B");
    assert_eq!(unescape("A%01B"), b"A\x01B");
    assert_eq!(unescape("A%00B"), b"A\x00B");
    assert_eq!(unescape("A%ffB"), b"A\xffB");
    assert_eq!(unescape("A%FfB"), b"A\xffB");
    assert_eq!(unescape("A%4FB"), b"AOB");
    assert_eq!(unescape("A%4fB"), b"AOB");
    assert_eq!(unescape("A%4gB"), b"A%4gB");
    assert_eq!(unescape("A%G4B"), b"A%G4B");
}

#[test]
fn test_parse_dl_uri() {
    let ok = |uri: &str, expect: &str| assert_eq!(parse(uri).as_deref(), Ok(expect), "{}", uri);

    ok("http://a/00/006141411234567890", "^00006141411234567890");
    ok("https://a/00/006141411234567890", "^00006141411234567890");
    ok("https://a/stem/00/006141411234567890", "^00006141411234567890");
    ok("https://a/more/stem/00/006141411234567890", "^00006141411234567890");
    // the rightmost primary key wins
    ok("https://a/00/faux/00/006141411234567890", "^00006141411234567890");

    ok("https://a/01/12312312312333", "^0112312312312333");
    ok("https://a/01/2112345678900", "^0102112345678900");
    ok("https://a/01/416000336108", "^0100416000336108");
    ok("https://a/01/02345673", "^0100000002345673");

    ok(
        "https://a/01/12312312312333/22/TEST/10/ABC/21/XYZ",
        "^011231231231233322TEST^10ABC^21XYZ",
    );
    ok("https://a/01/12312312312333/235/TEST", "^0112312312312333235TEST");
    ok("https://a/253/1231231231232", "^2531231231231232");
    ok(
        "https://a/253/1231231231232TEST5678901234567",
        "^2531231231231232TEST5678901234567",
    );
    ok("https://a/8018/123456789012345675/8019/123", "^8018123456789012345675^8019123");

    ok("https://a/stem/00/006141411234567890?99=ABC", "^0000614141123456789099ABC");
    ok("https://a/stem/401/12345678?99=ABC", "^40112345678^99ABC");
    ok("https://a/01/12312312312333?99=ABC&98=XYZ", "^011231231231233399ABC^98XYZ");
    ok(
        "https://a/01/12312312312333?&&&99=ABC&&&&&&98=XYZ&&&",
        "^011231231231233399ABC^98XYZ",
    );
    ok(
        "https://a/01/12312312312333?99=ABC&unknown=666&98=XYZ",
        "^011231231231233399ABC^98XYZ",
    );
    ok(
        "https://a/01/12312312312333?singleton&99=ABC&98=XYZ",
        "^011231231231233399ABC^98XYZ",
    );
    ok(
        "https://a/01/12312312312333?99=ABC&98=XYZ#fragment",
        "^011231231231233399ABC^98XYZ",
    );
    ok(
        "https://a/01/12312312312333/22/ABC%2d123?99=ABC&98=XYZ%2f987",
        "^011231231231233322ABC-123^99ABC^98XYZ/987",
    );

    ok(
        "https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426",
        "^010952012345678810ABC1^2112345^17180426",
    );
    ok(
        "https://example.com/01/9520123456788?3103=000195&3922=0299&17=201225",
        "^0109520123456788310300019539220299^17201225",
    );
    ok(
        "https://id.gs1.org/01/9520123456788?17=201225&3103=000195&3922=0299",
        "^010952012345678817201225310300019539220299",
    );
    ok(
        "https://id.gs1.org/00/952012345678912345?02=09520123456788&37=25&10=ABC123",
        "^0095201234567891234502095201234567883725^10ABC123",
    );
    ok("https://id.gs1.org/414/9520123456788/254/32a%2Fb", "^414952012345678825432a/b");
    ok(
        "https://example.com/8004/9520614141234567?01=9520123456788",
        "^80049520614141234567^0109520123456788",
    );
}

#[test]
fn test_parse_dl_uri_errors() {
    use SyntaxError::*;
    assert_eq!(parse(""), Err(UriScheme));
    assert_eq!(parse("ftp://"), Err(UriScheme));
    assert_eq!(parse("http://"), Err(UriPathInfo));
    assert_eq!(parse("http:///"), Err(UriPathInfo));
    assert_eq!(parse("http://a"), Err(UriPathInfo));
    assert_eq!(parse("http://a/"), Err(NoDlKey));
    assert_eq!(parse("https://00/006141411234567890"), Err(NoDlKey));
    assert_eq!(parse("https://a/stem/00/006141411234567890/"), Err(NoDlKey));
    assert_eq!(parse("https://a/01/1231231231233 3"), Err(UriCharacters));
    assert_eq!(
        parse("https://a/253/1231231231232TEST56789012345678"),
        Err(ValueTooLong("253".into()))
    );
    assert_eq!(
        parse("https://a/01/12312312312333?99=ABC&999=faux"),
        Err(UnknownQueryAi("999".into()))
    );
    assert_eq!(parse("https://a/01/12312312312333?99="), Err(DlValue("99".into())));
    assert_eq!(parse("https://a/01//22/X"), Err(DlValue("01".into())));
    assert_eq!(
        parse("https://a/01/12312312312334"),
        Err(CheckDigit("01".into()))
    );
    assert_eq!(parse("https://a/01/12312312312333/10/%ff"), Err(Cset82("10".into())));
    assert_eq!(
        parse("https://a/01/12312312312333/10/AB%5ECD"),
        Err(IllegalFnc1("10".into()))
    );
}

#[test]
fn test_parse_dl_uri_unknown_ais() {
    assert_eq!(
        parse("https://example.com/01/9520123456788/89/ABC123?99=XYZ"),
        Err(SyntaxError::NoDlKey)
    );
    assert_eq!(
        parse("https://example.com/01/9520123456788?99=XYZ&89=ABC123"),
        Err(SyntaxError::UnknownQueryAi("89".into()))
    );

    let parser = AiParser::default().with_unknown_ais(true);
    let parse = |uri: &str| parser.parse_dl_uri(uri).map(|data| data.as_str().to_string());
    assert_eq!(
        parse("https://example.com/01/9520123456788/89/ABC123?99=XYZ").as_deref(),
        Ok("^010952012345678889ABC123^99XYZ")
    );
    assert_eq!(
        parse("https://example.com/01/9520123456788?99=XYZ&89=ABC123").as_deref(),
        Ok("^010952012345678899XYZ^89ABC123")
    );
}

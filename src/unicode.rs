use crate::std::string::String;
use crate::std::vec::Vec;

use crate::Bar;

const QUIET_ZONE: usize = 10;

// Packs two modules into one block character.
struct Buffer {
    out: String,
    pending: Vec<bool>,
}

impl Buffer {
    fn new() -> Self {
        let mut out = String::new();
        out.extend(core::iter::repeat(' ').take(QUIET_ZONE / 2));
        Self {
            out,
            pending: Vec::with_capacity(2),
        }
    }

    fn push(&mut self, dark: bool) {
        self.pending.push(dark);
        if let [left, right] = self.pending[..] {
            self.out.push(match (left, right) {
                (true, true) => '█',
                (true, false) => '▌',
                (false, true) => '▐',
                (false, false) => ' ',
            });
            self.pending.clear();
        }
    }

    fn into_string(mut self) -> String {
        if !self.pending.is_empty() {
            self.push(false);
        }
        self.out
    }
}

/// Render bars with Unicode block characters, two modules per character.
///
/// The quiet zones are included.
///
/// ## Example
/// ```
/// # use gs1_encoders::{AiData, Gs1_128, bars_to_blocks};
/// let data = AiData::parse_bracketed("(3103)000195").unwrap();
/// assert_eq!(
///     bars_to_blocks(Gs1_128::encode(&data).bars()),
///     "     █▐ █▌▐█▌▌█▌█▐▌ █▐ ▌▐▌ █▐▌▐▌▐▌▐▌█ ▌██▐ ▐█ █ ▌█ ▐█▐▐▌     ",
/// );
/// ```
pub fn bars_to_blocks(bars: impl IntoIterator<Item = Bar>) -> String {
    let mut buf = Buffer::new();
    for bar in bars {
        for _ in 0..bar.width {
            buf.push(true);
        }
        for _ in 0..bar.space {
            buf.push(false);
        }
    }
    for _ in 0..QUIET_ZONE {
        buf.push(false);
    }
    buf.into_string()
}

#[test]
fn test_blocks() {
    assert_eq!(bars_to_blocks([]), "     ".repeat(2));
    assert_eq!(
        bars_to_blocks([Bar { width: 3, space: 1 }, Bar { width: 1, space: 0 }]),
        "     █▌▌     "
    );
}

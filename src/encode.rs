use crate::std::vec;
use crate::std::vec::Vec;

use super::{Bar, FNC1, FNC1_SYMBOL, START_B, START_C, SWITCH_B, SWITCH_C};

pub(crate) const PATTERNS: [u16; 109] = [
    0x6cc, 0x66c, 0x666, 0x498, 0x48c, 0x44c, 0x4c8, 0x4c4, 0x464, 0x648, 0x644, 0x624, 0x59c,
    0x4dc, 0x4ce, 0x5cc, 0x4ec, 0x4e6, 0x672, 0x65c, 0x64e, 0x6e4, 0x674, 0x76e, 0x74c, 0x72c,
    0x726, 0x764, 0x734, 0x732, 0x6d8, 0x6c6, 0x636, 0x518, 0x458, 0x446, 0x588, 0x468, 0x462,
    0x688, 0x628, 0x622, 0x5b8, 0x58e, 0x46e, 0x5d8, 0x5c6, 0x476, 0x776, 0x68e, 0x62e, 0x6e8,
    0x6e2, 0x6ee, 0x758, 0x746, 0x716, 0x768, 0x762, 0x71a, 0x77a, 0x642, 0x78a, 0x530, 0x50c,
    0x4b0, 0x486, 0x42c, 0x426, 0x590, 0x584, 0x4d0, 0x4c2, 0x434, 0x432, 0x612, 0x650, 0x7ba,
    0x614, 0x47a, 0x53c, 0x4bc, 0x49e, 0x5e4, 0x4f4, 0x4f2, 0x7a4, 0x794, 0x792, 0x6de, 0x6f6,
    0x7b6, 0x578, 0x51e, 0x45e, 0x5e8, 0x5e2, 0x7a8, 0x7a2, 0x5de, 0x5ee, 0x75e, 0x7ae, 0x684,
    0x690, 0x69c, 0x63a, 0x6b8, 0x18eb,
];

// AI data only contains printable ASCII, so code set A is never needed.
#[derive(Debug, PartialEq, Clone, Copy)]
enum Mode {
    B = 0,
    C = 1,
}

impl Mode {
    #[inline]
    fn other(self) -> Self {
        match self {
            Mode::B => Mode::C,
            Mode::C => Mode::B,
        }
    }

    #[inline]
    fn start(self) -> u8 {
        match self {
            Mode::B => START_B,
            Mode::C => START_C,
        }
    }

    #[inline]
    fn switch(self) -> u8 {
        match self {
            Mode::B => SWITCH_B,
            Mode::C => SWITCH_C,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Start,
    /// Switched from the other mode at the same position.
    Switch,
    /// Encoded the given number of bytes as one symbol.
    Advance(usize),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    cost: usize,
    step: Step,
}

impl Node {
    const UNREACHED: Self = Self {
        cost: usize::MAX,
        step: Step::Start,
    };

    fn relax(&mut self, cost: usize, step: Step) {
        if cost < self.cost {
            *self = Self { cost, step };
        }
    }
}

fn is_digit_pair(bytes: &[u8]) -> bool {
    matches!(bytes, [b'0'..=b'9', b'0'..=b'9', ..])
}

fn symbol(mode: Mode, chunk: &[u8]) -> u8 {
    match (mode, chunk) {
        (_, [FNC1]) => FNC1_SYMBOL,
        (Mode::B, [c]) => c - b' ',
        (Mode::C, [c1, c2]) => (c1 - b'0') * 10 + (c2 - b'0'),
        _ => unreachable!("chunk does not fit the code set"),
    }
}

/// Encode canonical AI data as Code 128 symbol characters, start character
/// included.
///
/// The shortest encoding is found by dynamic programming over the positions
/// of the data and the active code set. FNC1 is available in both code sets.
pub(super) fn encode_as_indices(bytes: &[u8]) -> Vec<u8> {
    let n = bytes.len();
    let mut nodes = vec![[Node::UNREACHED; 2]; n + 1];
    nodes[0] = [
        Node {
            cost: 1,
            step: Step::Start,
        }; 2
    ];

    for i in 0..=n {
        for mode in [Mode::B, Mode::C] {
            let switched = nodes[i][mode.other() as usize].cost.saturating_add(1);
            nodes[i][mode as usize].relax(switched, Step::Switch);
        }
        if i == n {
            break;
        }

        let cost = nodes[i][Mode::B as usize].cost.saturating_add(1);
        nodes[i + 1][Mode::B as usize].relax(cost, Step::Advance(1));

        let cost = nodes[i][Mode::C as usize].cost.saturating_add(1);
        if bytes[i] == FNC1 {
            nodes[i + 1][Mode::C as usize].relax(cost, Step::Advance(1));
        } else if is_digit_pair(&bytes[i..]) {
            nodes[i + 2][Mode::C as usize].relax(cost, Step::Advance(2));
        }
    }

    let mut mode = if nodes[n][Mode::C as usize].cost < nodes[n][Mode::B as usize].cost {
        Mode::C
    } else {
        Mode::B
    };
    let mut i = n;
    let mut indices = Vec::with_capacity(nodes[n][mode as usize].cost);
    loop {
        match nodes[i][mode as usize].step {
            Step::Start => {
                indices.push(mode.start());
                break;
            }
            Step::Switch => {
                indices.push(mode.switch());
                mode = mode.other();
            }
            Step::Advance(len) => {
                indices.push(symbol(mode, &bytes[i - len..i]));
                i -= len;
            }
        }
    }
    indices.reverse();
    indices
}

/// Convert the bits of a pattern to bars, most significant bit first.
pub(super) fn bits_to_bars(mut bits: u16) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(3);
    while bits != 0 {
        let mut width = 0;
        let zeroes = bits.leading_zeros();
        for i in (0..(16 - zeroes)).rev() {
            if bits & (1 << i) != 0 {
                width += 1;
                bits ^= 1 << i;
            } else {
                break;
            }
        }
        bars.push(Bar {
            width: width as u8,
            space: (bits.leading_zeros() - width - zeroes) as u8,
        });
    }
    bars
}

#[test]
fn test_bits_to_bars() {
    assert_eq!(bits_to_bars(0), vec![]);
    assert_eq!(
        bits_to_bars(0b10000011010),
        vec![
            Bar { width: 1, space: 5 },
            Bar { width: 2, space: 1 },
            Bar { width: 1, space: 1 },
        ]
    );
    assert_eq!(
        bits_to_bars(0b1100011101011),
        vec![
            Bar { width: 2, space: 3 },
            Bar { width: 3, space: 1 },
            Bar { width: 1, space: 1 },
            Bar { width: 2, space: 0 },
        ]
    );
}

#[test]
fn test_patterns() {
    for (i, pattern) in PATTERNS.iter().cloned().enumerate() {
        assert_eq!(crate::decode::lookup(pattern), Ok(i as u8));
    }
}

#[test]
fn test_all_digits() {
    assert_eq!(
        encode_as_indices(b"^0112345678901231"),
        vec![START_C, FNC1_SYMBOL, 1, 12, 34, 56, 78, 90, 12, 31],
    );
    assert_eq!(
        encode_as_indices(b"^12345678"),
        vec![START_C, FNC1_SYMBOL, 12, 34, 56, 78],
    );
}

#[test]
fn test_fnc1_in_code_set_c() {
    assert_eq!(
        encode_as_indices(b"^1012^1234"),
        vec![START_C, FNC1_SYMBOL, 10, 12, FNC1_SYMBOL, 12, 34],
    );
}

#[test]
fn test_alphanumeric() {
    assert_eq!(
        encode_as_indices(b"^ABC"),
        vec![START_B, FNC1_SYMBOL, b'A' - b' ', b'B' - b' ', b'C' - b' '],
    );
}

#[test]
fn test_minimal_length() {
    // odd digit runs leave one digit for code set B
    assert_eq!(encode_as_indices(b"^1234567").len(), 7);
    assert_eq!(encode_as_indices(b"^123").len(), 5);
    // two digits are not worth a switch
    assert_eq!(encode_as_indices(b"^A12B").len(), 6);
    // four digits are
    assert_eq!(encode_as_indices(b"^ABC^12345678").len(), 11);
    assert_eq!(encode_as_indices(b"^10ABC123^2112345678").len(), 16);
}

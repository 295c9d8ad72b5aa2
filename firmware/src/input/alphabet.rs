/// Byte stored in a passphrase buffer for an accepted space.
///
/// It is swapped for a literal space only once the passphrase has been confirmed, so the check
/// screen can draw a visible marker instead of a blank.
pub const SPACE_PLACEHOLDER: u8 = b'\t';

/// One selectable entry of the on-device picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Char(u8),
    Space,
    Backspace,
    Done,
}

impl Symbol {
    /// Byte appended to the buffer when this entry is accepted.
    pub fn byte(self) -> Option<u8> {
        match self {
            Symbol::Char(byte) => Some(byte),
            Symbol::Space => Some(SPACE_PLACEHOLDER),
            Symbol::Backspace | Symbol::Done => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Symbol::Char(byte) => char::from(byte),
            Symbol::Space => '␣',
            Symbol::Backspace => '⌫',
            Symbol::Done => '✓',
        }
    }
}

/// Direction used to land on a `Done` entry once the buffer is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoneSeek {
    Forward,
    /// Forward from the first half of the alphabet, backward from the second.
    ByHalf,
}

/// Ordered picker entries split into display groups.
#[derive(Debug, PartialEq, Eq)]
pub struct EntryAlphabet {
    symbols: &'static [Symbol],
    groups: &'static [usize],
    allow_empty: bool,
    done_seek: DoneSeek,
}

impl EntryAlphabet {
    pub fn symbols(&self) -> &'static [Symbol] {
        self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.symbols.get(index).copied()
    }

    /// Group start offsets; the final offset equals [`EntryAlphabet::len`].
    pub fn groups(&self) -> &'static [usize] {
        self.groups
    }

    /// Whether `Done` may finish an entry with nothing typed.
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    /// Nearest `Done` entry from `seed`, searched in the configured direction first.
    pub fn find_done(&self, seed: usize) -> Option<usize> {
        let forward = match self.done_seek {
            DoneSeek::Forward => true,
            DoneSeek::ByHalf => seed < self.len() / 2,
        };

        self.seek_done(seed, forward)
            .or_else(|| self.seek_done(seed, !forward))
    }

    fn seek_done(&self, seed: usize, forward: bool) -> Option<usize> {
        if seed >= self.len() {
            return None;
        }

        if forward {
            (seed..self.len()).find(|index| self.symbols[*index] == Symbol::Done)
        } else {
            (0..=seed)
                .rev()
                .find(|index| self.symbols[*index] == Symbol::Done)
        }
    }
}

const fn c(byte: u8) -> Symbol {
    Symbol::Char(byte)
}

const BS: Symbol = Symbol::Backspace;
const OK: Symbol = Symbol::Done;
const SP: Symbol = Symbol::Space;

static PIN_SYMBOLS: [Symbol; 12] = [
    c(b'1'),
    c(b'2'),
    c(b'3'),
    c(b'4'),
    c(b'5'),
    c(b'6'),
    c(b'7'),
    c(b'8'),
    c(b'9'),
    c(b'0'),
    BS,
    OK,
];

#[rustfmt::skip]
static PASSPHRASE_SYMBOLS: [Symbol; 116] = [
    c(b'a'), c(b'b'), c(b'c'), c(b'd'), c(b'e'), c(b'f'), c(b'g'), c(b'h'), c(b'i'), BS, OK,
    c(b'j'), c(b'k'), c(b'l'), c(b'm'), c(b'n'), c(b'o'), c(b'p'), c(b'q'), c(b'r'), BS, OK,
    c(b's'), c(b't'), c(b'u'), c(b'v'), c(b'w'), c(b'x'), c(b'y'), c(b'z'), SP, BS, OK,
    c(b'A'), c(b'B'), c(b'C'), c(b'D'), c(b'E'), c(b'F'), c(b'G'), c(b'H'), c(b'I'), BS, OK,
    c(b'J'), c(b'K'), c(b'L'), c(b'M'), c(b'N'), c(b'O'), c(b'P'), c(b'Q'), c(b'R'), BS, OK,
    c(b'S'), c(b'T'), c(b'U'), c(b'V'), c(b'W'), c(b'X'), c(b'Y'), c(b'Z'), SP, BS, OK,
    c(b'1'), c(b'2'), c(b'3'), c(b'4'), c(b'5'), c(b'6'), c(b'7'), c(b'8'), c(b'9'), c(b'0'), BS, OK,
    c(b'!'), c(b'@'), c(b'#'), c(b'$'), c(b'%'), c(b'^'), c(b'&'), c(b'*'), c(b'('), c(b')'), BS, OK,
    c(b'`'), c(b'-'), c(b'='), c(b'['), c(b']'), c(b'\\'), c(b';'), c(b'\''), c(b','), c(b'.'), c(b'/'), BS, OK,
    c(b'~'), c(b'_'), c(b'+'), c(b'{'), c(b'}'), c(b'|'), c(b':'), c(b'"'), c(b'<'), c(b'>'), c(b'?'), BS, OK,
];

/// Digits, backspace and done. Empty PINs are not accepted from the picker.
pub static PIN_ALPHABET: EntryAlphabet = EntryAlphabet {
    symbols: &PIN_SYMBOLS,
    groups: &[0, 12],
    allow_empty: false,
    done_seek: DoneSeek::Forward,
};

/// Letters, digits and punctuation in ten groups, each closing with backspace and done.
pub static PASSPHRASE_ALPHABET: EntryAlphabet = EntryAlphabet {
    symbols: &PASSPHRASE_SYMBOLS,
    groups: &[0, 11, 22, 33, 44, 55, 66, 78, 90, 103, 116],
    allow_empty: true,
    done_seek: DoneSeek::ByHalf,
};

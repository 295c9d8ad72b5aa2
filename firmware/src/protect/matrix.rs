use rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::secret::PinBuffer;
use crate::ui::PinMatrixView;

/// Byte recorded for a matrix position outside `'1'..='9'`.
pub const INVALID_POSITION: u8 = b'X';

/// Per-request permutation of the digits 1 to 9.
///
/// The host only ever sees keypad positions; the digits behind them are known to the device
/// alone, so the layout is wiped as soon as the request ends.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PinMatrix {
    digits: [u8; 9],
}

impl PinMatrix {
    pub fn shuffled(rng: &mut dyn RngCore) -> Self {
        let mut digits = *b"123456789";
        for index in (1..digits.len()).rev() {
            let swap = rng.next_u32() as usize % (index + 1);
            digits.swap(index, swap);
        }
        Self { digits }
    }

    pub fn view<'a>(&'a self, prompt: &'a str) -> PinMatrixView<'a> {
        PinMatrixView {
            prompt,
            digits: &self.digits,
        }
    }

    /// Digit shown at a position character, `'1'` being the top-left cell.
    pub fn digit_at(&self, position: u8) -> u8 {
        match position {
            b'1'..=b'9' => self.digits[usize::from(position - b'1')],
            _ => INVALID_POSITION,
        }
    }

    /// Translate relayed positions into digits. Returns `false` when they do not fit `pin`.
    pub fn decode(&self, positions: &[u8], pin: &mut PinBuffer) -> bool {
        pin.clear();
        if positions.len() > pin.capacity() {
            return false;
        }
        for position in positions {
            pin.push(self.digit_at(*position));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn shuffle_is_a_permutation_of_digits() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..32 {
            let matrix = PinMatrix::shuffled(&mut rng);
            let mut sorted = matrix.digits;
            sorted.sort_unstable();
            assert_eq!(&sorted, b"123456789");
        }
    }

    #[test]
    fn decode_maps_positions_through_layout() {
        let matrix = PinMatrix {
            digits: *b"987654321",
        };
        let mut pin = PinBuffer::new();
        assert!(matrix.decode(b"19", &mut pin));
        assert_eq!(pin.as_bytes(), b"91");
    }

    #[test]
    fn unknown_positions_become_invalid_marker() {
        let matrix = PinMatrix {
            digits: *b"123456789",
        };
        let mut pin = PinBuffer::new();
        assert!(matrix.decode(b"1a0", &mut pin));
        assert_eq!(pin.as_bytes(), b"1XX");
    }

    #[test]
    fn oversized_entry_leaves_buffer_empty() {
        let matrix = PinMatrix {
            digits: *b"123456789",
        };
        let mut pin = PinBuffer::from_slice(b"55").unwrap();
        assert!(!matrix.decode(&[b'1'; 51], &mut pin));
        assert!(pin.is_empty());
    }
}

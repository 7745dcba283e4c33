//! Stub word layouts and identity-token extraction.
//!
//! A stub word is an opaque bit-packed integer. The only field this crate reads
//! is the stub index ("token"), whose position and the overall word width differ
//! between barrel and disk stubs:
//!
//! ```text
//! barrel (32 bits): | valid:1 | index:10 | phi resid:12 | z resid:9 |
//! disk   (30 bits): | valid:1 | index:10 | phi resid:12 | r resid:7 |
//! ```

use serde::{Deserialize, Serialize};

/// Raw stub word. Only the low `word_bits` of the owning region's layout are meaningful.
pub type StubWord = u64;

/// Number of detector layers per candidate.
pub const LAYER_COUNT: usize = 4;

/// Stub slots per layer. Slot 0 is the primary slot.
pub const SLOTS_PER_LAYER: usize = 4;

/// Width of the stub index field, identical for both regions.
pub const TOKEN_BITS: u32 = 10;

/// Upper bound of a comparison's match count (one barrel + one disk flag per layer).
pub const MAX_LAYER_MATCHES: u32 = 2 * LAYER_COUNT as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Barrel,
    Disk,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Barrel, Region::Disk];

    pub const fn layout(self) -> StubLayout {
        match self {
            Self::Barrel => BARREL_LAYOUT,
            Self::Disk => DISK_LAYOUT,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Barrel => write!(f, "barrel"),
            Self::Disk => write!(f, "disk"),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "barrel" => Ok(Self::Barrel),
            "disk" => Ok(Self::Disk),
            other => Err(format!("unknown region '{other}' (expected barrel or disk)")),
        }
    }
}

/// Bit geometry of one region's stub word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubLayout {
    /// Total meaningful width of the word.
    pub word_bits: u32,
    /// Least significant bit of the token field.
    pub token_lsb: u32,
    /// Width of the token field.
    pub token_bits: u32,
}

pub const BARREL_LAYOUT: StubLayout = StubLayout {
    word_bits: 32,
    token_lsb: 21,
    token_bits: TOKEN_BITS,
};

pub const DISK_LAYOUT: StubLayout = StubLayout {
    word_bits: 30,
    token_lsb: 19,
    token_bits: TOKEN_BITS,
};

impl StubLayout {
    /// Most significant bit of the token field (inclusive).
    pub const fn token_msb(&self) -> u32 {
        self.token_lsb + self.token_bits - 1
    }

    pub const fn token_mask(&self) -> u64 {
        (1u64 << self.token_bits) - 1
    }

    /// Every bit of the word set. Also the conflict sentinel for secondary slots.
    pub const fn word_mask(&self) -> StubWord {
        (1u64 << self.word_bits) - 1
    }

    pub const fn valid_bit(&self) -> StubWord {
        1u64 << (self.word_bits - 1)
    }

    /// Extract the stub index token.
    #[inline]
    pub const fn token(&self, word: StubWord) -> u32 {
        ((word >> self.token_lsb) & self.token_mask()) as u32
    }

    /// Build a valid stub word carrying `token`, with zeroed residuals.
    pub const fn stub_word(&self, token: u32) -> StubWord {
        self.valid_bit() | ((token as u64 & self.token_mask()) << self.token_lsb)
    }

    /// Whether `word` fits in `word_bits`.
    pub const fn fits(&self, word: StubWord) -> bool {
        word & !self.word_mask() == 0
    }
}

/// Extract the identity token of `word` using `region`'s layout.
#[inline]
pub const fn extract_token(word: StubWord, region: Region) -> u32 {
    region.layout().token(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ranges() {
        assert_eq!(BARREL_LAYOUT.token_msb(), 30);
        assert_eq!(DISK_LAYOUT.token_msb(), 28);
        assert!(BARREL_LAYOUT.token_msb() < BARREL_LAYOUT.word_bits - 1);
        assert!(DISK_LAYOUT.token_msb() < DISK_LAYOUT.word_bits - 1);
    }

    #[test]
    fn extract_ignores_residuals_and_valid_bit() {
        let word = BARREL_LAYOUT.stub_word(0x2A5) | 0x1F_FFFF;
        assert_eq!(extract_token(word, Region::Barrel), 0x2A5);

        let word = DISK_LAYOUT.stub_word(7) | 0x7_FFFF;
        assert_eq!(extract_token(word, Region::Disk), 7);
    }

    #[test]
    fn regions_read_different_ranges() {
        // Bit 21 is the barrel token LSB but sits inside the disk token field.
        let word: StubWord = 1 << 21;
        assert_eq!(extract_token(word, Region::Barrel), 1);
        assert_eq!(extract_token(word, Region::Disk), 4);
    }

    #[test]
    fn zero_word_has_zero_token() {
        for region in Region::ALL {
            assert_eq!(extract_token(0, region), 0);
        }
    }

    #[test]
    fn valid_bit_alone_is_not_a_token() {
        assert_eq!(extract_token(BARREL_LAYOUT.valid_bit(), Region::Barrel), 0);
        assert_eq!(extract_token(DISK_LAYOUT.valid_bit(), Region::Disk), 0);
    }

    #[test]
    fn word_masks() {
        assert_eq!(BARREL_LAYOUT.word_mask(), 0xFFFF_FFFF);
        assert_eq!(DISK_LAYOUT.word_mask(), 0x3FFF_FFFF);
        assert!(DISK_LAYOUT.fits(DISK_LAYOUT.word_mask()));
        assert!(!DISK_LAYOUT.fits(1 << 30));
    }

    #[test]
    fn region_parse() {
        assert_eq!("Barrel".parse::<Region>().unwrap(), Region::Barrel);
        assert_eq!(" disk ".parse::<Region>().unwrap(), Region::Disk);
        assert!("endcap".parse::<Region>().is_err());
    }
}

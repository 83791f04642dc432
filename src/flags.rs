//! Packed bit fields

/// A `u32` read and written as a set of bit ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FlagField(u32);

impl FlagField {
    pub const fn new(bits: u32) -> Self {
        FlagField(bits)
    }

    /// The whole word as stored on disk
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Read `width` bits starting at bit `start`.
    pub const fn bits(self, start: u32, width: u32) -> u32 {
        (self.0 >> start) & mask(width)
    }

    /// Overwrite `width` bits starting at bit `start`.
    ///
    /// Excess high bits of `value` are dropped; bits outside the range
    /// are left as they were.
    pub fn set_bits(&mut self, start: u32, width: u32, value: u32) {
        let field = mask(width) << start;
        self.0 = (self.0 & !field) | ((value & mask(width)) << start);
    }

    pub const fn bit(self, index: u32) -> bool {
        self.bits(index, 1) != 0
    }

    pub fn set_bit(&mut self, index: u32, value: bool) {
        self.set_bits(index, 1, value as u32);
    }
}

const fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

impl From<u32> for FlagField {
    fn from(bits: u32) -> Self {
        FlagField(bits)
    }
}

/// A 4-bit unsigned value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Nibble(u8);

impl Nibble {
    pub const MAX: Nibble = Nibble(15);

    /// Returns `None` if `value` does not fit in four bits.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 15 {
            Some(Nibble(value))
        } else {
            None
        }
    }

    /// Keep only the low four bits of `value`.
    pub const fn truncate(value: u32) -> Self {
        Nibble((value & 0xF) as u8)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<Nibble> for u32 {
    fn from(n: Nibble) -> u32 {
        n.0 as u32
    }
}

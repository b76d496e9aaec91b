//! Generation-checked identity of one playback instance.

/// Bits of the raw form that hold the slot index; caps the channel table size.
pub(crate) const INDEX_BITS: u32 = 10;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
/// Generations count modulo this, keeping every raw value below
/// [`SoundHandle::INVALID_RAW`].
const GENERATION_LIMIT: u32 = (1 << (32 - INDEX_BITS)) - 1;

/// Generation a slot moves to after retiring a sound of `generation`.
pub(crate) fn next_generation(generation: u32) -> u32 {
    (generation + 1) % GENERATION_LIMIT
}

/// Opaque reference to a playing sound.
///
/// A handle names a channel slot plus the slot's generation at the time the
/// sound started. Slots bump their generation when a sound ends, so a handle
/// kept past the end of its sound never aliases whatever plays in the slot
/// next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle {
    index: u16,
    generation: u32,
}

impl SoundHandle {
    /// Raw value reserved for "no sound".
    pub const INVALID_RAW: u32 = u32::MAX;

    pub(crate) fn new(index: u16, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot in the channel table.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into a 32-bit value for engines that store plain integers.
    pub fn to_raw(self) -> u32 {
        self.generation << INDEX_BITS | self.index as u32
    }

    /// Inverse of [`SoundHandle::to_raw`]; `None` for [`SoundHandle::INVALID_RAW`].
    pub fn from_raw(raw: u32) -> Option<Self> {
        if raw == Self::INVALID_RAW {
            return None;
        }
        Some(Self {
            index: (raw & INDEX_MASK) as u16,
            generation: raw >> INDEX_BITS,
        })
    }
}

/// Raw form of an optional handle, using the reserved sentinel for `None`.
pub fn raw_or_invalid(handle: Option<SoundHandle>) -> u32 {
    handle.map_or(SoundHandle::INVALID_RAW, SoundHandle::to_raw)
}

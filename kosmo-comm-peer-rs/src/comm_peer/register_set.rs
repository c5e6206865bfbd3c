use super::error::RegisterSetError;

/// Number of mix levels in a register set.
pub const MIX_CHANNELS: usize = 5;

/// Wire size of a [`RegisterSet`]: one bank byte plus two bytes per mix level.
pub const REGISTER_SET_LEN: usize = 1 + 2 * MIX_CHANNELS;

/// The sampler's register block: a bank selector and five mix levels.
///
/// # Wire format
///
/// ```text
/// byte 0      bank
/// bytes 1–2   mix[0], little-endian
/// ...
/// bytes 9–10  mix[4], little-endian
/// ```
///
/// No length prefix and no checksum; both sides know the size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterSet {
    /// Selected sample bank.
    pub bank: u8,
    /// Mix level per voice.
    pub mix: [u16; MIX_CHANNELS],
}

impl RegisterSet {
    /// All-zero register set, the power-on state.
    pub const fn new() -> Self {
        Self {
            bank: 0,
            mix: [0; MIX_CHANNELS],
        }
    }

    /// Serialize into the fixed wire format.
    pub fn to_bytes(&self) -> [u8; REGISTER_SET_LEN] {
        let mut bytes = [0u8; REGISTER_SET_LEN];
        bytes[0] = self.bank;
        for (chunk, level) in bytes[1..].chunks_exact_mut(2).zip(self.mix) {
            chunk.copy_from_slice(&level.to_le_bytes());
        }
        bytes
    }

    /// Decode a record from the start of `bytes`.
    ///
    /// Bytes past [`REGISTER_SET_LEN`] are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use kosmo_comm::comm_peer::RegisterSet;
    ///
    /// let set = RegisterSet::from_bytes(&[2, 0x34, 0x12, 1, 0, 0, 0, 0, 0, 0xFF, 0xFF]).unwrap();
    /// assert_eq!(set.bank, 2);
    /// assert_eq!(set.mix, [0x1234, 1, 0, 0, 0xFFFF]);
    ///
    /// assert!(RegisterSet::from_bytes(&[2, 0x34]).is_err());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegisterSetError> {
        let record = bytes
            .get(..REGISTER_SET_LEN)
            .ok_or(RegisterSetError::Truncated {
                expected: REGISTER_SET_LEN,
                actual: bytes.len(),
            })?;

        let mut set = Self::new();
        set.bank = record[0];
        for (level, chunk) in set.mix.iter_mut().zip(record[1..].chunks_exact(2)) {
            *level = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(set)
    }
}

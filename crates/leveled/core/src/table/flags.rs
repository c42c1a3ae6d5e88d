use bitflags::bitflags;

bitflags! {
    /// Resolution-mode bits of a leveled list.
    ///
    /// `USE_ALL` and `CALCULATE_FOR_EACH_ITEM` combine: each requested draw
    /// emits every eligible entry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ListFlags: u32 {
        /// Keep every entry at or below the subject level, not just the highest tier.
        const CALCULATE_FROM_ALL_LEVELS = 1 << 0;
        /// One independent draw per requested item instead of one draw for the list.
        const CALCULATE_FOR_EACH_ITEM   = 1 << 1;
        /// Emit every eligible entry instead of drawing one.
        const USE_ALL                   = 1 << 2;
        /// Marks special loot; carried for the host, no resolver semantics.
        const SPECIAL_LOOT              = 1 << 3;
    }
}

impl ListFlags {
    /// Decodes raw bits, rejecting any bit outside the known set.
    pub fn decode(bits: u32) -> Option<Self> {
        Self::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_unknown_bits() {
        assert_eq!(ListFlags::decode(0x04), Some(ListFlags::USE_ALL));
        assert_eq!(
            ListFlags::decode(0x06),
            Some(ListFlags::USE_ALL | ListFlags::CALCULATE_FOR_EACH_ITEM)
        );
        assert_eq!(ListFlags::decode(0x10), None);
        assert_eq!(ListFlags::decode(0), Some(ListFlags::empty()));
    }
}

/// Resolver tunables.
///
/// Loaded from `resolver.toml` by `leveled-content`; missing keys fall back to
/// the defaults below.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    /// Maximum nesting of list-in-list expansion. The root list is depth 0.
    pub max_depth: u8,
    /// Largest requested count accepted by a single call.
    /// Anything above is treated as a caller error and resolves to nothing.
    pub max_requested_count: u32,
}

impl ResolverConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_DEPTH: u8 = 16;
    pub const DEFAULT_MAX_REQUESTED_COUNT: u32 = 65_535;

    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_requested_count: Self::DEFAULT_MAX_REQUESTED_COUNT,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_requested_count(mut self, max_requested_count: u32) -> Self {
        self.max_requested_count = max_requested_count;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

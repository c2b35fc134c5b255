/// Fidelity tier controls how finely circles are tessellated and shaded.
/// Tiers only change visuals; they NEVER change simulation or hit testing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FidelityTier {
    /// Mobile-safe baseline: coarse rings, no glossy highlight.
    Tier0,
    /// Full sphere shading with the glossy highlight spot.
    #[default]
    Tier2,
}

impl FidelityTier {
    /// All tiers in display order.
    pub const ALL: &'static [FidelityTier] = &[FidelityTier::Tier0, FidelityTier::Tier2];

    /// Short human-readable label for overlay display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tier0 => "Tier 0 (Mobile)",
            Self::Tier2 => "Tier 2 (PC)",
        }
    }

    /// Cycle to the next tier (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Tier0 => Self::Tier2,
            Self::Tier2 => Self::Tier0,
        }
    }

    /// Angular subdivisions of each shaded ring.
    pub fn circle_segments(self) -> u32 {
        match self {
            Self::Tier0 => 24,
            Self::Tier2 => 48,
        }
    }

    /// Concentric rings used to approximate the sphere gradient.
    pub fn circle_rings(self) -> u32 {
        match self {
            Self::Tier0 => 12,
            Self::Tier2 => 24,
        }
    }

    pub fn draws_highlight(self) -> bool {
        matches!(self, Self::Tier2)
    }
}

impl std::fmt::Display for FidelityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_full_quality() {
        assert_eq!(FidelityTier::default(), FidelityTier::Tier2);
    }

    #[test]
    fn next_cycles_through_tiers() {
        assert_eq!(FidelityTier::Tier0.next(), FidelityTier::Tier2);
        assert_eq!(FidelityTier::Tier2.next(), FidelityTier::Tier0);
    }

    #[test]
    fn display_matches_label() {
        for &tier in FidelityTier::ALL {
            assert_eq!(format!("{}", tier), tier.label());
        }
    }

    #[test]
    fn mobile_tier_is_cheaper() {
        let low = FidelityTier::Tier0;
        let high = FidelityTier::Tier2;
        assert!(low.circle_segments() < high.circle_segments());
        assert!(low.circle_rings() < high.circle_rings());
        assert!(!low.draws_highlight());
        assert!(high.draws_highlight());
    }
}

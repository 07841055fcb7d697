//! Type-safe integer identifier wrappers.
//!
//! Every entity kind has its own strongly-typed ID so a settlement ID can
//! never be passed where a reactor ID is expected. IDs are allocated
//! sequentially per kind by the world, starting at 1, which makes
//! ascending-ID iteration order equal to creation order.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// The first identifier handed out for this entity kind.
            pub const FIRST: Self = Self(1);

            /// Return the identifier that follows this one, or `None` on overflow.
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(n) => Some(Self(n)),
                    None => None,
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a settlement.
    SettlementId
}

define_id! {
    /// Unique identifier for a reactor.
    ReactorId
}

define_id! {
    /// Unique identifier for a contamination cloud.
    ContaminationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_sequential() {
        assert_eq!(SettlementId::FIRST.next(), Some(SettlementId(2)));
        assert_eq!(ReactorId(u32::MAX).next(), None);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = ReactorId(17);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("17"));
        let restored: Result<ReactorId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_integer() {
        assert_eq!(ContaminationId(42).to_string(), "42");
    }
}

//! Instruction-set revisions (feature gates)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction-set revision, ordered oldest to newest
///
/// An opcode introduced at revision `R` is undefined under every revision
/// older than `R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    /// Initial instruction set
    Frontier,
    /// Homestead
    Homestead,
    /// Tangerine Whistle
    TangerineWhistle,
    /// Spurious Dragon
    SpuriousDragon,
    /// Byzantium, introduces REVERT
    Byzantium,
    /// Constantinople
    Constantinople,
    /// Petersburg
    Petersburg,
    /// Istanbul
    Istanbul,
    /// Berlin
    Berlin,
    /// London
    London,
    /// Paris
    Paris,
    /// Shanghai, introduces PUSH0
    Shanghai,
    /// Cancun
    Cancun,
    /// Prague
    Prague,
}

impl Revision {
    /// Newest supported revision
    pub const LATEST: Revision = Revision::Prague;

    /// All revisions, oldest first
    pub const ALL: [Revision; 14] = [
        Revision::Frontier,
        Revision::Homestead,
        Revision::TangerineWhistle,
        Revision::SpuriousDragon,
        Revision::Byzantium,
        Revision::Constantinople,
        Revision::Petersburg,
        Revision::Istanbul,
        Revision::Berlin,
        Revision::London,
        Revision::Paris,
        Revision::Shanghai,
        Revision::Cancun,
        Revision::Prague,
    ];

    /// True if this revision is `other` or newer
    pub fn is_enabled(self, other: Revision) -> bool {
        self >= other
    }
}

impl Default for Revision {
    fn default() -> Self {
        Revision::LATEST
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Revision::Frontier < Revision::Byzantium);
        assert!(Revision::Byzantium.is_enabled(Revision::Byzantium));
        assert!(!Revision::SpuriousDragon.is_enabled(Revision::Byzantium));
        assert!(Revision::LATEST.is_enabled(Revision::Shanghai));
    }

    #[test]
    fn test_all_is_sorted() {
        assert!(Revision::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Revision::ALL[Revision::ALL.len() - 1], Revision::LATEST);
        assert_eq!(Revision::default(), Revision::LATEST);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Revision::TangerineWhistle).unwrap();
        assert_eq!(json, "\"tangerine_whistle\"");
        let rev: Revision = serde_json::from_str("\"byzantium\"").unwrap();
        assert_eq!(rev, Revision::Byzantium);
    }
}

//! Rule configuration for a map session.
//!
//! Every field has a default, so an empty `rules.ron` (or none at all) gives
//! the classic behaviour.
//!
//! # Example RON
//!
//! ```ron
//! Rules(
//!     movement: cost_aware,
//!     threat_reach: equipped_weapon,
//!     class_lookup: by_id,
//!     fallback_stats: (hp: 20, mov: 5),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::data::StatsData;
use crate::equipment::ClassLookup;
use crate::error::{Result, TacticsError};
use crate::range::{MovementRule, ThreatReach};

/// Tunable rules applied by the battlefield and the action state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// How movement ranges are computed.
    #[serde(default)]
    pub movement: MovementRule,

    /// How threatened distances are picked.
    #[serde(default)]
    pub threat_reach: ThreatReach,

    /// How a unit's class is resolved for wieldability.
    #[serde(default)]
    pub class_lookup: ClassLookup,

    /// Stats given to placed units with no unit record.
    #[serde(default)]
    pub fallback_stats: StatsData,
}

impl Rules {
    /// Parse rules from a RON document.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::DataParseError`] if the document is malformed.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| TacticsError::DataParseError {
            source_name: "rules".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rules_are_classic() {
        let rules = Rules::from_ron_str("()").unwrap();
        assert_eq!(rules, Rules::default());
        assert_eq!(rules.movement, MovementRule::DistanceBound);
        assert_eq!(rules.class_lookup, ClassLookup::ById);
        assert_eq!(rules.fallback_stats.movement, 5);
    }

    #[test]
    fn test_parse_overrides() {
        let rules = Rules::from_ron_str(
            "(movement: cost_aware, threat_reach: equipped_weapon, class_lookup: by_display_name, fallback_stats: (mov: 3))",
        )
        .unwrap();
        assert_eq!(rules.movement, MovementRule::CostAware);
        assert_eq!(rules.threat_reach, ThreatReach::EquippedWeapon);
        assert_eq!(rules.class_lookup, ClassLookup::ByDisplayName);
        assert_eq!(rules.fallback_stats.movement, 3);
        assert_eq!(rules.fallback_stats.hp, 20);
    }

    #[test]
    fn test_malformed_rules() {
        let err = Rules::from_ron_str("(movement: teleport)").unwrap_err();
        assert!(matches!(err, TacticsError::DataParseError { .. }));
    }
}

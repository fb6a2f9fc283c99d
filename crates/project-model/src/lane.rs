//! Timeline lanes.
//!
//! Lanes are stored top-to-bottom. Text lanes always sit above video
//! lanes, which sit above audio lanes.

use serde::{Deserialize, Serialize};

/// Lane identifier.
pub type LaneId = String;

/// What a lane may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    Video,
    Audio,
    Text,
}

impl LaneKind {
    /// Sort key for the top-to-bottom lane order (lower renders higher).
    pub fn priority(self) -> u8 {
        match self {
            LaneKind::Text => 0,
            LaneKind::Video => 1,
            LaneKind::Audio => 2,
        }
    }

    /// Id prefix used when allocating lanes of this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            LaneKind::Video => "lane-video",
            LaneKind::Audio => "lane-audio",
            LaneKind::Text => "lane-text",
        }
    }
}

/// A single timeline lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub kind: LaneKind,
}

impl Lane {
    pub fn new(id: impl Into<LaneId>, kind: LaneKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Stable-sort lanes into text > video > audio order.
///
/// Lanes of the same kind keep their relative order.
pub fn sort_lanes(lanes: &mut [Lane]) {
    lanes.sort_by_key(|lane| lane.kind.priority());
}

/// Whether `lanes` already satisfies the ordering invariant.
pub fn lanes_are_ordered(lanes: &[Lane]) -> bool {
    lanes
        .windows(2)
        .all(|pair| pair[0].kind.priority() <= pair[1].kind.priority())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable_by_priority() {
        let mut lanes = vec![
            Lane::new("a1", LaneKind::Audio),
            Lane::new("v1", LaneKind::Video),
            Lane::new("t1", LaneKind::Text),
            Lane::new("v2", LaneKind::Video),
            Lane::new("t2", LaneKind::Text),
        ];
        sort_lanes(&mut lanes);
        let ids: Vec<&str> = lanes.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "v1", "v2", "a1"]);
        assert!(lanes_are_ordered(&lanes));
    }

    #[test]
    fn test_unordered_detected() {
        let lanes = vec![
            Lane::new("v1", LaneKind::Video),
            Lane::new("t1", LaneKind::Text),
        ];
        assert!(!lanes_are_ordered(&lanes));
    }
}

use serde::Serialize;
use utoipa::ToSchema;

/// Loyalty levels, unlocked by lifetime points earned
const LEVELS: [(&str, i64); 5] = [
    ("Bronze", 0),
    ("Silver", 500),
    ("Gold", 2_000),
    ("Platinum", 5_000),
    ("Diamond", 10_000),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LevelInfo {
    pub name: String,
    pub min_points: i64,
    pub next_level: Option<String>,
    /// Points still needed for the next level, `None` at the top
    pub points_to_next_level: Option<i64>,
}

pub fn level_for(lifetime_points: i64) -> LevelInfo {
    let idx = LEVELS
        .iter()
        .rposition(|(_, min)| lifetime_points >= *min)
        .unwrap_or(0);
    let (name, min_points) = LEVELS[idx];
    let next = LEVELS.get(idx + 1);

    LevelInfo {
        name: name.to_string(),
        min_points,
        next_level: next.map(|(n, _)| n.to_string()),
        points_to_next_level: next.map(|(_, min)| min - lifetime_points.max(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for(0).name, "Bronze");
        assert_eq!(level_for(499).name, "Bronze");
        assert_eq!(level_for(500).name, "Silver");
        assert_eq!(level_for(2_000).name, "Gold");
        assert_eq!(level_for(9_999).name, "Platinum");
        assert_eq!(level_for(250_000).name, "Diamond");
    }

    #[test]
    fn test_points_to_next_level() {
        let info = level_for(100);
        assert_eq!(info.next_level.as_deref(), Some("Silver"));
        assert_eq!(info.points_to_next_level, Some(400));

        let top = level_for(10_000);
        assert_eq!(top.next_level, None);
        assert_eq!(top.points_to_next_level, None);
    }
}

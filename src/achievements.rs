//! Achievement evaluation.
//!
//! Nothing here touches the database: unlocked/remaining is a pure function
//! of a point balance and the static catalog, recomputed on every read.

use crate::models::Achievement;

/// Progress against a single achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Progress {
    /// Whether the balance meets the threshold.
    pub unlocked: bool,

    /// Points still missing, 0 once unlocked.
    pub points_remaining: i64,
}

/// Evaluate one achievement against a point balance.
pub fn progress(points: i64, achievement: &Achievement) -> Progress {
    Progress {
        unlocked: points >= achievement.points_required,
        points_remaining: (achievement.points_required - points).max(0),
    }
}

/// Evaluate the whole catalog against a point balance, in catalog order.
pub fn evaluate(points: i64, catalog: &[Achievement]) -> Vec<Progress> {
    catalog.iter().map(|a| progress(points, a)).collect()
}

/// Count of achievements unlocked at the given balance.
pub fn unlocked_count(points: i64, catalog: &[Achievement]) -> usize {
    catalog
        .iter()
        .filter(|a| points >= a.points_required)
        .count()
}

/// Achievements newly unlocked by moving from `old_points` to `new_points`.
///
/// Zero-threshold achievements are granted on first sight rather than by a
/// point award, so they never count as crossed.
pub fn crossed<'a>(
    old_points: i64,
    new_points: i64,
    catalog: &'a [Achievement],
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| {
            a.points_required > 0
                && old_points < a.points_required
                && new_points >= a.points_required
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(thresholds: &[i64]) -> Vec<Achievement> {
        thresholds
            .iter()
            .enumerate()
            .map(|(i, &points_required)| Achievement {
                id: i as i64 + 1,
                name: format!("badge-{points_required}"),
                description: None,
                icon: "🌱".to_string(),
                points_required,
                position: i as i64 + 1,
            })
            .collect()
    }

    #[test]
    fn test_evaluate_unlocks_up_to_balance() {
        let catalog = catalog(&[0, 100, 500, 1000]);
        let result = evaluate(500, &catalog);

        let unlocked: Vec<bool> = result.iter().map(|p| p.unlocked).collect();
        assert_eq!(unlocked, [true, true, true, false]);

        let remaining: Vec<i64> = result.iter().map(|p| p.points_remaining).collect();
        assert_eq!(remaining, [0, 0, 0, 500]);
    }

    #[test]
    fn test_evaluate_zero_balance() {
        let catalog = catalog(&[0, 100]);
        let result = evaluate(0, &catalog);

        assert!(result[0].unlocked);
        assert!(!result[1].unlocked);
        assert_eq!(result[1].points_remaining, 100);
    }

    #[test]
    fn test_unlocked_count() {
        let catalog = catalog(&[0, 100, 500, 1000]);

        assert_eq!(unlocked_count(0, &catalog), 1);
        assert_eq!(unlocked_count(99, &catalog), 1);
        assert_eq!(unlocked_count(100, &catalog), 2);
        assert_eq!(unlocked_count(2000, &catalog), 4);
    }

    #[test]
    fn test_crossed_single_threshold() {
        let catalog = catalog(&[0, 100, 500, 1000]);

        let crossed = crossed(80, 130, &catalog);
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].points_required, 100);
    }

    #[test]
    fn test_crossed_multiple_thresholds_in_one_award() {
        let catalog = catalog(&[0, 100, 500, 1000]);

        let crossed = crossed(90, 600, &catalog);
        let thresholds: Vec<i64> = crossed.iter().map(|a| a.points_required).collect();
        assert_eq!(thresholds, [100, 500]);
    }

    #[test]
    fn test_crossed_ignores_zero_threshold_and_already_unlocked() {
        let catalog = catalog(&[0, 100]);

        // Zero-threshold badge is never "crossed".
        assert!(crossed(0, 50, &catalog).is_empty());

        // Already past the threshold: nothing new.
        assert!(crossed(150, 200, &catalog).is_empty());

        // Landing exactly on the threshold counts.
        assert_eq!(crossed(50, 100, &catalog).len(), 1);
    }
}

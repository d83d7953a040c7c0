//! Cell style classification.

use crate::types::CellStyleRule;

/// Returns the first rule whose `[min, max)` range contains `value`.
///
/// Rules are scanned in order, so overlapping rules resolve to whichever
/// comes first. An empty rule list never matches.
pub fn classify(value: i64, rules: &[CellStyleRule]) -> Option<&CellStyleRule> {
    rules.iter().find(|rule| rule.matches(value))
}

/// A five-step green ramp used when no rules are configured.
pub fn default_rules() -> Vec<CellStyleRule> {
    vec![
        CellStyleRule::new("#ebedf0", 0, 1),
        CellStyleRule::new("#9be9a8", 1, 2),
        CellStyleRule::new("#40c463", 2, 5),
        CellStyleRule::new("#30a14e", 5, 10),
        CellStyleRule::new("#216e39", 10, i64::MAX),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(color: &str, min: i64, max: i64) -> CellStyleRule {
        CellStyleRule::new(color, min, max)
    }

    #[test]
    fn empty_rules_never_match() {
        for value in [i64::MIN, -1, 0, 1, 42, i64::MAX] {
            assert_eq!(classify(value, &[]), None);
        }
    }

    #[test]
    fn first_match_wins_on_overlap() {
        let rules = [rule("A", 0, 5), rule("B", 3, 10)];
        assert_eq!(classify(4, &rules).map(|r| r.color.as_str()), Some("A"));
        assert_eq!(classify(5, &rules).map(|r| r.color.as_str()), Some("B"));
    }

    #[test]
    fn max_is_exclusive_and_min_inclusive() {
        let rules = [rule("A", 0, 5)];
        assert_eq!(classify(5, &rules), None);
        assert_eq!(classify(0, &rules).map(|r| r.color.as_str()), Some("A"));
    }

    #[test]
    fn malformed_rules_are_skipped() {
        let rules = [rule("never", 8, 3), rule("fallback", 0, 100)];
        assert_eq!(classify(5, &rules).map(|r| r.color.as_str()), Some("fallback"));
    }

    #[test]
    fn text_label_travels_with_rule() {
        let rules = [rule("#fff", 1, 3).with_text("few")];
        let matched = classify(2, &rules).unwrap();
        assert_eq!(matched.text.as_deref(), Some("few"));
    }

    #[test]
    fn default_ramp_covers_non_negative_counts() {
        let rules = default_rules();
        for value in [0, 1, 3, 7, 10, 10_000] {
            assert!(classify(value, &rules).is_some(), "{value}");
        }
        assert_eq!(classify(0, &rules).map(|r| r.color.as_str()), Some("#ebedf0"));
        assert_eq!(classify(12, &rules).map(|r| r.color.as_str()), Some("#216e39"));
        assert_eq!(classify(-1, &rules), None);
    }
}

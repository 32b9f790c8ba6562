//! Temporary price resolution.
//!
//! Pure functions over a caller-supplied slice of rules. Nothing here touches
//! the database: the services load the rules and hand them in, so the same
//! functions serve the admin screens, the public menu and the tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::temporary_price::{TemporaryPrice, TemporaryPriceStatus};

/// True when `at` lies inside the rule's window, both ends inclusive.
pub fn window_contains(rule: &TemporaryPrice, at: DateTime<Utc>) -> bool {
    rule.start_at <= at && at <= rule.end_at
}

/// The rule in effect for `item_id` at `at`, if any.
///
/// Only enabled rules whose window contains `at` qualify. When windows
/// overlap the rule with the latest `start_at` wins; on equal `start_at` the
/// earlier rule in `rules` is kept.
pub fn active_rule(
    rules: &[TemporaryPrice],
    item_id: Uuid,
    at: DateTime<Utc>,
) -> Option<&TemporaryPrice> {
    rules
        .iter()
        .filter(|r| r.menu_item_id == item_id && r.enabled && window_contains(r, at))
        .fold(None, |best: Option<&TemporaryPrice>, r| match best {
            Some(b) if b.start_at >= r.start_at => Some(b),
            _ => Some(r),
        })
}

/// Rules for `item_id` starting after `at`, enabled or not, earliest first.
pub fn upcoming_rules(
    rules: &[TemporaryPrice],
    item_id: Uuid,
    at: DateTime<Utc>,
) -> Vec<&TemporaryPrice> {
    let mut out: Vec<&TemporaryPrice> = rules
        .iter()
        .filter(|r| r.menu_item_id == item_id && r.start_at > at)
        .collect();
    out.sort_by_key(|r| r.start_at);
    out
}

/// Rules for `item_id` that ended before `at`, most recently ended first.
pub fn expired_rules(
    rules: &[TemporaryPrice],
    item_id: Uuid,
    at: DateTime<Utc>,
) -> Vec<&TemporaryPrice> {
    let mut out: Vec<&TemporaryPrice> = rules
        .iter()
        .filter(|r| r.menu_item_id == item_id && r.end_at < at)
        .collect();
    out.sort_by(|a, b| b.end_at.cmp(&a.end_at));
    out
}

/// Price charged for the item at `at`.
pub fn effective_price(
    base_price: Decimal,
    rules: &[TemporaryPrice],
    item_id: Uuid,
    at: DateTime<Utc>,
) -> Decimal {
    active_rule(rules, item_id, at)
        .map(|r| r.price)
        .unwrap_or(base_price)
}

/// Where the rule's window sits relative to `at`, ignoring `enabled`.
pub fn rule_status(rule: &TemporaryPrice, at: DateTime<Utc>) -> TemporaryPriceStatus {
    if rule.start_at > at {
        TemporaryPriceStatus::Upcoming
    } else if rule.end_at < at {
        TemporaryPriceStatus::Expired
    } else {
        TemporaryPriceStatus::Active
    }
}

/// Every rule of one item, grouped the way the admin dashboard shows them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSchedule<'a> {
    pub active: Option<&'a TemporaryPrice>,
    /// Enabled, window contains `at`, but lost to `active`.
    pub overridden: Vec<&'a TemporaryPrice>,
    /// Disabled, window contains `at`.
    pub disabled: Vec<&'a TemporaryPrice>,
    pub upcoming: Vec<&'a TemporaryPrice>,
    pub expired: Vec<&'a TemporaryPrice>,
}

/// Group the item's rules into active, overridden, disabled, upcoming and expired at `at`.
pub fn schedule(rules: &[TemporaryPrice], item_id: Uuid, at: DateTime<Utc>) -> PriceSchedule<'_> {
    let active = active_rule(rules, item_id, at);
    let mut overridden = Vec::new();
    let mut disabled = Vec::new();

    for r in rules
        .iter()
        .filter(|r| r.menu_item_id == item_id && window_contains(r, at))
    {
        if !r.enabled {
            disabled.push(r);
        } else if active.map(|a| a.id) != Some(r.id) {
            overridden.push(r);
        }
    }
    overridden.sort_by(|a, b| b.start_at.cmp(&a.start_at));

    PriceSchedule {
        active,
        overridden,
        disabled,
        upcoming: upcoming_rules(rules, item_id, at),
        expired: expired_rules(rules, item_id, at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, h, 0, 0).unwrap()
    }

    fn rule(item: Uuid, name: &str, price: i64, start: DateTime<Utc>, end: DateTime<Utc>, enabled: bool) -> TemporaryPrice {
        TemporaryPrice {
            id: Uuid::new_v4(),
            menu_item_id: item,
            rule_name: name.to_string(),
            price: Decimal::from(price),
            start_at: start,
            end_at: end,
            enabled,
            created_at: ts(1, 0),
            updated_at: ts(1, 0),
        }
    }

    #[test]
    fn live_band_night_is_active_inside_window() {
        let item = Uuid::new_v4();
        let rules = vec![rule(item, "Live Band Night", 6500, ts(1, 20), ts(1, 23), true)];

        let active = active_rule(&rules, item, ts(1, 21)).unwrap();
        assert_eq!(active.rule_name, "Live Band Night");
        assert_eq!(
            effective_price(Decimal::from(5000), &rules, item, ts(1, 21)),
            Decimal::from(6500)
        );
    }

    #[test]
    fn falls_back_to_base_price_after_window() {
        let item = Uuid::new_v4();
        let rules = vec![rule(item, "Live Band Night", 6500, ts(1, 20), ts(1, 23), true)];

        assert!(active_rule(&rules, item, ts(2, 0)).is_none());
        assert_eq!(
            effective_price(Decimal::from(5000), &rules, item, ts(2, 0)),
            Decimal::from(5000)
        );
    }

    #[test]
    fn overlapping_rules_latest_start_wins() {
        let item = Uuid::new_v4();
        let rules = vec![
            rule(item, "A", 100, ts(1, 10), ts(1, 14), true),
            rule(item, "B", 200, ts(1, 12), ts(1, 16), true),
        ];
        assert_eq!(active_rule(&rules, item, ts(1, 13)).unwrap().rule_name, "B");

        // Input order does not matter.
        let reversed: Vec<_> = rules.iter().rev().cloned().collect();
        assert_eq!(active_rule(&reversed, item, ts(1, 13)).unwrap().rule_name, "B");
    }

    #[test]
    fn equal_start_keeps_first_in_input_order() {
        let item = Uuid::new_v4();
        let rules = vec![
            rule(item, "first", 100, ts(1, 10), ts(1, 14), true),
            rule(item, "second", 200, ts(1, 10), ts(1, 16), true),
        ];
        assert_eq!(active_rule(&rules, item, ts(1, 11)).unwrap().rule_name, "first");
    }

    #[test]
    fn disabled_rule_never_active() {
        let item = Uuid::new_v4();
        let rules = vec![rule(item, "A", 100, ts(1, 10), ts(1, 14), false)];
        assert!(active_rule(&rules, item, ts(1, 12)).is_none());
        assert_eq!(
            effective_price(Decimal::from(50), &rules, item, ts(1, 12)),
            Decimal::from(50)
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let item = Uuid::new_v4();
        let rules = vec![rule(item, "A", 100, ts(1, 10), ts(1, 14), true)];
        assert!(active_rule(&rules, item, ts(1, 10)).is_some());
        assert!(active_rule(&rules, item, ts(1, 14)).is_some());
        assert!(active_rule(&rules, item, ts(1, 9)).is_none());
        assert!(active_rule(&rules, item, ts(1, 15)).is_none());
    }

    #[test]
    fn rules_of_other_items_are_ignored() {
        let item = Uuid::new_v4();
        let other = Uuid::new_v4();
        let rules = vec![
            rule(other, "other", 100, ts(1, 10), ts(1, 14), true),
            rule(other, "other later", 100, ts(3, 10), ts(3, 14), true),
        ];
        assert!(active_rule(&rules, item, ts(1, 12)).is_none());
        assert!(upcoming_rules(&rules, item, ts(1, 0)).is_empty());
        assert!(expired_rules(&rules, item, ts(5, 0)).is_empty());
    }

    #[test]
    fn upcoming_sorted_ascending_and_includes_disabled() {
        let item = Uuid::new_v4();
        let rules = vec![
            rule(item, "late", 1, ts(5, 10), ts(5, 12), true),
            rule(item, "early", 1, ts(3, 10), ts(3, 12), false),
            rule(item, "past", 1, ts(1, 10), ts(1, 12), true),
            rule(item, "middle", 1, ts(4, 10), ts(4, 12), true),
        ];
        let names: Vec<_> = upcoming_rules(&rules, item, ts(2, 0))
            .into_iter()
            .map(|r| r.rule_name.as_str())
            .collect();
        assert_eq!(names, ["early", "middle", "late"]);
    }

    #[test]
    fn expired_sorted_by_end_descending() {
        let item = Uuid::new_v4();
        let rules = vec![
            rule(item, "oldest", 1, ts(1, 1), ts(1, 2), true),
            rule(item, "newest", 1, ts(3, 1), ts(3, 2), false),
            rule(item, "middle", 1, ts(2, 1), ts(2, 2), true),
            rule(item, "running", 1, ts(4, 1), ts(6, 2), true),
        ];
        let names: Vec<_> = expired_rules(&rules, item, ts(5, 0))
            .into_iter()
            .map(|r| r.rule_name.as_str())
            .collect();
        assert_eq!(names, ["newest", "middle", "oldest"]);
    }

    #[test]
    fn active_rule_always_has_window_containing_instant() {
        let item = Uuid::new_v4();
        let rules: Vec<_> = (0..12u32)
            .map(|i| {
                rule(
                    item,
                    &format!("r{i}"),
                    i as i64,
                    ts(1 + i % 5, i % 7),
                    ts(3 + i % 4, 10 + i % 9),
                    i % 3 != 0,
                )
            })
            .collect();

        for day in 1..=8 {
            for h in [0, 6, 12, 18, 23] {
                let at = ts(day, h);
                match active_rule(&rules, item, at) {
                    Some(r) => {
                        assert!(r.enabled);
                        assert!(window_contains(r, at));
                        assert_eq!(effective_price(Decimal::from(999), &rules, item, at), r.price);
                        // No other qualifying rule starts later.
                        assert!(rules
                            .iter()
                            .filter(|o| o.enabled && window_contains(o, at))
                            .all(|o| o.start_at <= r.start_at));
                    }
                    None => {
                        assert!(!rules.iter().any(|o| o.enabled && window_contains(o, at)));
                        assert_eq!(
                            effective_price(Decimal::from(999), &rules, item, at),
                            Decimal::from(999)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn status_reflects_window_only() {
        let item = Uuid::new_v4();
        let r = rule(item, "A", 1, ts(2, 10), ts(2, 12), false);
        assert_eq!(rule_status(&r, ts(1, 0)), TemporaryPriceStatus::Upcoming);
        assert_eq!(rule_status(&r, ts(2, 11)), TemporaryPriceStatus::Active);
        assert_eq!(rule_status(&r, ts(2, 12)), TemporaryPriceStatus::Active);
        assert_eq!(rule_status(&r, ts(3, 0)), TemporaryPriceStatus::Expired);
    }

    #[test]
    fn schedule_groups_every_rule() {
        let item = Uuid::new_v4();
        let rules = vec![
            rule(item, "winner", 1, ts(2, 8), ts(2, 20), true),
            rule(item, "loser", 1, ts(2, 6), ts(2, 20), true),
            rule(item, "off", 1, ts(2, 9), ts(2, 20), false),
            rule(item, "soon", 1, ts(3, 9), ts(3, 20), true),
            rule(item, "gone", 1, ts(1, 9), ts(1, 20), true),
        ];
        let s = schedule(&rules, item, ts(2, 10));
        assert_eq!(s.active.unwrap().rule_name, "winner");
        assert_eq!(s.overridden.len(), 1);
        assert_eq!(s.overridden[0].rule_name, "loser");
        assert_eq!(s.disabled.len(), 1);
        assert_eq!(s.disabled[0].rule_name, "off");
        assert_eq!(s.upcoming.len(), 1);
        assert_eq!(s.expired.len(), 1);
    }
}

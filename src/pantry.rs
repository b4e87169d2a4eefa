//! # Pantry Ordering Policy
//!
//! Produces the order in which a user's pantry is shown, and classifies each
//! item's expiry status.
//!
//! ## Ordering
//!
//! 1. An optional name prefix filters the snapshot (prefix only, case-insensitive)
//! 2. Incomplete items (no usable expiry date, or a blank quantity) come first, by name ignoring case and accents
//! 3. Complete items follow, soonest expiry first, ties broken by name
//!
//! ## Expiry dates
//!
//! Dates come from storage as text. `YYYY-MM-DD` and ISO timestamps are
//! accepted; anything else counts as "no expiry" instead of failing the view.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::normalize::{compare_names, normalize_name, same_name, starts_with_normalized};

/// Days an item may be past its date before it is reported as expired
pub const DEFAULT_EXPIRY_GRACE_DAYS: i64 = 1;

/// Items expiring within this many days are reported as near expiry
pub const DEFAULT_NEAR_EXPIRY_DAYS: i64 = 3;

/// A pantry record as supplied by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryItem {
    /// Display name, unique per owner
    pub name: String,

    /// Free-text quantity; empty means "not specified"
    #[serde(default)]
    pub quantity: String,

    /// Raw expiry date as stored
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Expiry classification of a pantry item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Expired,
    Near,
    Ok,
    /// No parseable expiry date
    None,
}

/// Thresholds used by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// An item is expired once its date is more than this many days in the past
    pub grace_days: i64,
    /// An item is near expiry when its date is at most this many days ahead
    pub near_days: i64,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            grace_days: DEFAULT_EXPIRY_GRACE_DAYS,
            near_days: DEFAULT_NEAR_EXPIRY_DAYS,
        }
    }
}

/// A pantry item paired with its expiry status, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryView {
    #[serde(flatten)]
    pub item: PantryItem,
    pub status: ExpiryStatus,
}

impl PantryItem {
    pub fn new(name: &str, quantity: &str, expiry_date: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            quantity: quantity.to_string(),
            expiry_date: expiry_date.map(str::to_string),
        }
    }

    /// Create an item whose expiry is a known calendar date
    pub fn with_date(name: &str, quantity: &str, expiry: NaiveDate) -> Self {
        Self::new(name, quantity, Some(&expiry.format("%Y-%m-%d").to_string()))
    }

    /// The parsed expiry date, if the stored value is usable
    pub fn expiry(&self) -> Option<NaiveDate> {
        self.expiry_date.as_deref().and_then(parse_expiry_date)
    }

    pub fn has_quantity(&self) -> bool {
        !self.quantity.trim().is_empty()
    }

    /// Both a usable expiry date and a non-blank quantity are present
    pub fn is_complete(&self) -> bool {
        self.has_quantity() && self.expiry().is_some()
    }

    /// Whether this item refers to the given ingredient name, ignoring case
    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    /// Date used to order complete items; `None` for incomplete ones
    fn ordering_date(&self) -> Option<NaiveDate> {
        if self.has_quantity() {
            self.expiry()
        } else {
            None
        }
    }
}

/// Parse a stored expiry value into a calendar date
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use cookify::pantry::parse_expiry_date;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 6, 1);
/// assert_eq!(parse_expiry_date("2025-06-01"), expected);
/// assert_eq!(parse_expiry_date("2025-06-01T00:00:00Z"), expected);
/// assert_eq!(parse_expiry_date("next week"), None);
/// ```
pub fn parse_expiry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.date());
        }
    }

    trace!("Unparseable expiry date '{}', treating as absent", raw);
    None
}

/// Classify an item's expiry relative to `today`
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, NaiveDate};
/// use cookify::pantry::{classify, ExpiryPolicy, ExpiryStatus, PantryItem};
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let policy = ExpiryPolicy::default();
///
/// let milk = PantryItem::with_date("Milk", "1L", today + Duration::days(2));
/// assert_eq!(classify(&milk, today, &policy), ExpiryStatus::Near);
/// ```
pub fn classify(item: &PantryItem, today: NaiveDate, policy: &ExpiryPolicy) -> ExpiryStatus {
    let Some(expiry) = item.expiry() else {
        return ExpiryStatus::None;
    };

    let days_left = (expiry - today).num_days();
    if days_left < -policy.grace_days {
        ExpiryStatus::Expired
    } else if days_left <= policy.near_days {
        ExpiryStatus::Near
    } else {
        ExpiryStatus::Ok
    }
}

fn compare_items(a: &PantryItem, b: &PantryItem) -> Ordering {
    match (a.ordering_date(), b.ordering_date()) {
        (None, None) => compare_names(&a.name, &b.name),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| compare_names(&a.name, &b.name)),
    }
}

/// Filter and order a pantry snapshot for display
///
/// # Arguments
///
/// * `items` - The current pantry snapshot
/// * `query_prefix` - Optional name prefix; blank means "no filter"
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, NaiveDate};
/// use cookify::pantry::{order, PantryItem};
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let items = vec![
///     PantryItem::with_date("Milk", "1L", today + Duration::days(1)),
///     PantryItem::new("Eggs", "", None),
///     PantryItem::with_date("Bread", "1 loaf", today + Duration::days(5)),
/// ];
///
/// let names: Vec<String> = order(&items, None).into_iter().map(|i| i.name).collect();
/// assert_eq!(names, vec!["Eggs", "Milk", "Bread"]);
/// ```
pub fn order(items: &[PantryItem], query_prefix: Option<&str>) -> Vec<PantryItem> {
    let prefix = query_prefix.map(normalize_name).unwrap_or_default();

    let mut ordered: Vec<PantryItem> = items
        .iter()
        .filter(|item| prefix.is_empty() || starts_with_normalized(&item.name, &prefix))
        .cloned()
        .collect();

    ordered.sort_by(compare_items);

    debug!(
        "Ordered {} of {} pantry items (prefix: '{}')",
        ordered.len(),
        items.len(),
        prefix
    );
    ordered
}

/// Order a pantry snapshot and attach each item's expiry status
pub fn annotate(
    items: &[PantryItem],
    query_prefix: Option<&str>,
    today: NaiveDate,
    policy: &ExpiryPolicy,
) -> Vec<PantryView> {
    order(items, query_prefix)
        .into_iter()
        .map(|item| {
            let status = classify(&item, today, policy);
            PantryView { item, status }
        })
        .collect()
}

/// Find the pantry item for an ingredient name, ignoring case
pub fn find<'a>(items: &'a [PantryItem], name: &str) -> Option<&'a PantryItem> {
    items.iter().find(|item| item.is_named(name))
}

/// Whether the pantry already holds an ingredient, ignoring case
pub fn contains(items: &[PantryItem], name: &str) -> bool {
    find(items, name).is_some()
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::Near => "near",
            ExpiryStatus::Ok => "ok",
            ExpiryStatus::None => "none",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn in_days(days: i64) -> NaiveDate {
        today() + Duration::days(days)
    }

    fn names(items: &[PantryItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_incomplete_then_nearest_expiry() {
        let items = vec![
            PantryItem::with_date("Milk", "1L", in_days(1)),
            PantryItem::new("Eggs", "", None),
            PantryItem::with_date("Bread", "1 loaf", in_days(5)),
        ];

        let ordered = order(&items, None);
        assert_eq!(names(&ordered), vec!["Eggs", "Milk", "Bread"]);
    }

    #[test]
    fn test_incomplete_items_sorted_by_name() {
        let items = vec![
            PantryItem::new("flour", "", Some("2025-07-01")),
            PantryItem::new("Butter", "250g", None),
            PantryItem::new("apples", "   ", None),
            PantryItem::with_date("Cheese", "200g", in_days(10)),
        ];

        let ordered = order(&items, None);
        assert_eq!(names(&ordered), vec!["apples", "Butter", "flour", "Cheese"]);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letter() {
        let items = vec![
            PantryItem::new("Zucchini", "", None),
            PantryItem::new("Épinards", "", None),
            PantryItem::new("Eggs", "", None),
            PantryItem::new("Fraises", "", None),
            PantryItem::with_date("œufs", "6", in_days(2)),
            PantryItem::with_date("Oignons", "3", in_days(2)),
        ];

        let ordered = order(&items, None);
        assert_eq!(
            names(&ordered),
            vec!["Eggs", "Épinards", "Fraises", "Zucchini", "œufs", "Oignons"]
        );
    }

    #[test]
    fn test_complete_items_by_expiry_then_name() {
        let items = vec![
            PantryItem::with_date("Yogurt", "2", in_days(3)),
            PantryItem::with_date("cream", "1", in_days(3)),
            PantryItem::with_date("Ham", "100g", in_days(1)),
            PantryItem::with_date("Rice", "1kg", in_days(300)),
        ];

        let ordered = order(&items, None);
        assert_eq!(names(&ordered), vec!["Ham", "cream", "Yogurt", "Rice"]);
    }

    #[test]
    fn test_malformed_expiry_counts_as_incomplete() {
        let items = vec![
            PantryItem::with_date("Apple", "3", in_days(2)),
            PantryItem::new("Zucchini", "1", Some("soon")),
        ];

        let ordered = order(&items, None);
        assert_eq!(names(&ordered), vec!["Zucchini", "Apple"]);
        assert_eq!(
            classify(&ordered[0], today(), &ExpiryPolicy::default()),
            ExpiryStatus::None
        );
    }

    #[test]
    fn test_prefix_filter() {
        let items = vec![
            PantryItem::new("Chicken", "1kg", None),
            PantryItem::new("Zucchini", "2", None),
            PantryItem::new("chickpeas", "1 can", None),
            PantryItem::new("Cheddar", "", None),
        ];

        let ordered = order(&items, Some("ch"));
        assert_eq!(names(&ordered), vec!["Cheddar", "Chicken", "chickpeas"]);

        let ordered = order(&items, Some("  CHI "));
        assert_eq!(names(&ordered), vec!["Chicken", "chickpeas"]);

        assert!(order(&items, Some("ucc")).is_empty());
    }

    #[test]
    fn test_blank_prefix_keeps_everything() {
        let items = vec![
            PantryItem::new("Salt", "", None),
            PantryItem::new("Pepper", "", None),
        ];
        assert_eq!(order(&items, Some("   ")).len(), 2);
        assert_eq!(order(&items, Some("")).len(), 2);
    }

    #[test]
    fn test_order_is_idempotent() {
        let items = vec![
            PantryItem::with_date("Milk", "1L", in_days(1)),
            PantryItem::new("milk", "", None),
            PantryItem::new("Eggs", "", None),
            PantryItem::with_date("Bread", "1 loaf", in_days(1)),
        ];

        let first = order(&items, None);
        let second = order(&items, None);
        assert_eq!(first, second);

        let reordered = order(&first, None);
        assert_eq!(first, reordered);
    }

    #[test]
    fn test_classify_thresholds() {
        let policy = ExpiryPolicy::default();
        let item = |days| PantryItem::with_date("x", "1", in_days(days));

        assert_eq!(classify(&item(-3), today(), &policy), ExpiryStatus::Expired);
        assert_eq!(classify(&item(-2), today(), &policy), ExpiryStatus::Expired);
        assert_eq!(classify(&item(-1), today(), &policy), ExpiryStatus::Near);
        assert_eq!(classify(&item(0), today(), &policy), ExpiryStatus::Near);
        assert_eq!(classify(&item(2), today(), &policy), ExpiryStatus::Near);
        assert_eq!(classify(&item(3), today(), &policy), ExpiryStatus::Near);
        assert_eq!(classify(&item(4), today(), &policy), ExpiryStatus::Ok);
        assert_eq!(classify(&item(10), today(), &policy), ExpiryStatus::Ok);
        assert_eq!(
            classify(&PantryItem::new("x", "1", None), today(), &policy),
            ExpiryStatus::None
        );
    }

    #[test]
    fn test_classify_custom_policy() {
        let policy = ExpiryPolicy {
            grace_days: 0,
            near_days: 7,
        };
        let yesterday = PantryItem::with_date("x", "1", in_days(-1));
        let next_week = PantryItem::with_date("x", "1", in_days(7));

        assert_eq!(classify(&yesterday, today(), &policy), ExpiryStatus::Expired);
        assert_eq!(classify(&next_week, today(), &policy), ExpiryStatus::Near);
    }

    #[test]
    fn test_parse_expiry_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 20);
        assert_eq!(parse_expiry_date("2025-06-20"), expected);
        assert_eq!(parse_expiry_date(" 2025-06-20 "), expected);
        assert_eq!(parse_expiry_date("2025-06-20T08:30:00Z"), expected);
        assert_eq!(parse_expiry_date("2025-06-20T08:30:00.123"), expected);
        assert_eq!(parse_expiry_date("20/06/2025"), None);
        assert_eq!(parse_expiry_date(""), None);
    }

    #[test]
    fn test_annotate_attaches_status() {
        let items = vec![
            PantryItem::with_date("Milk", "1L", in_days(-5)),
            PantryItem::new("Eggs", "", None),
        ];

        let views = annotate(&items, None, today(), &ExpiryPolicy::default());
        assert_eq!(views[0].item.name, "Eggs");
        assert_eq!(views[0].status, ExpiryStatus::None);
        assert_eq!(views[1].status, ExpiryStatus::Expired);

        let json = serde_json::to_value(&views[1]).unwrap();
        assert_eq!(json["name"], "Milk");
        assert_eq!(json["status"], "expired");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let items = vec![PantryItem::new("Olive Oil", "500ml", None)];

        assert!(contains(&items, "olive oil"));
        assert!(contains(&items, " OLIVE OIL "));
        assert!(!contains(&items, "olive"));
        assert_eq!(find(&items, "olive oil").map(|i| i.quantity.as_str()), Some("500ml"));
    }
}

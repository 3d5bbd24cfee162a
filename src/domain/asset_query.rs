use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::tag::normalize_tag_names;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Raw listing parameters as they arrive in the query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AssetListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub tags: Option<String>,
    pub mime_type: Option<String>,
    pub created_at: Option<String>,
}

/// Half-open `[start, end)` interval covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Owner-scoped listing constraints. Every tag in `tags` must be present on a
/// matching asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFilter {
    pub owner_id: Uuid,
    pub mime_type: Option<String>,
    pub tags: Vec<String>,
    pub created_window: Option<DayWindow>,
}

impl AssetFilter {
    /// Malformed optional constraints are dropped rather than rejected.
    pub fn from_query<Tz: TimeZone>(owner_id: Uuid, query: &AssetListQuery, tz: &Tz) -> Self {
        let mime_type = query.mime_type
            .as_deref()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .map(str::to_string);

        let tags = query.tags
            .as_deref()
            .map(|raw| normalize_tag_names(&raw.split(',').collect::<Vec<_>>()))
            .unwrap_or_default();

        let created_window = query.created_at
            .as_deref()
            .and_then(|raw| calendar_day_window(raw, tz));

        AssetFilter {
            owner_id,
            mime_type,
            tags,
            created_window,
        }
    }
}

/// Resolves a date or timestamp to the local calendar day it falls on.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// values (read as local time). Returns `None` for anything else.
pub fn calendar_day_window<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DayWindow> {
    let raw = raw.trim();

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(tz).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })?;

    let start = local_midnight(tz, day)?;
    let end = local_midnight(tz, day.succ_opt()?)?;

    Some(DayWindow { start, end })
}

// Midnight can be skipped by a DST transition; the day then starts an hour later.
fn local_midnight<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;

    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Pagination {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn from_query(query: &AssetListQuery) -> Self {
        let page = parse_number(query.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_number(query.limit.as_deref()).unwrap_or(DEFAULT_LIMIT);
        Pagination::new(page, limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn query() -> AssetListQuery {
        AssetListQuery::default()
    }

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn defaults_when_nothing_is_given() {
        let pagination = Pagination::from_query(&query());
        assert_eq!(pagination, Pagination { page: 1, limit: 20 });
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let q = AssetListQuery {
            page: Some("0".into()),
            limit: Some("500".into()),
            ..query()
        };
        assert_eq!(Pagination::from_query(&q), Pagination { page: 1, limit: 100 });

        let q = AssetListQuery {
            page: Some("-3".into()),
            limit: Some("0".into()),
            ..query()
        };
        assert_eq!(Pagination::from_query(&q), Pagination { page: 1, limit: 1 });
    }

    #[test]
    fn garbage_numbers_fall_back_to_defaults() {
        let q = AssetListQuery {
            page: Some("two".into()),
            limit: Some("10.5".into()),
            ..query()
        };
        assert_eq!(Pagination::from_query(&q), Pagination::default());
    }

    #[test]
    fn offset_and_total_pages() {
        let pagination = Pagination::new(3, 20);
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(20), 1);
        assert_eq!(pagination.total_pages(41), 3);
    }

    #[test]
    fn tags_are_split_normalized_and_deduplicated() {
        let q = AssetListQuery {
            tags: Some(" Dog,outdoor,,DOG ".into()),
            ..query()
        };
        let filter = AssetFilter::from_query(Uuid::nil(), &q, &Utc);
        assert_eq!(filter.tags, vec!["dog", "outdoor"]);
    }

    #[test]
    fn blank_constraints_are_ignored() {
        let q = AssetListQuery {
            tags: Some(" , ".into()),
            mime_type: Some("   ".into()),
            created_at: Some("yesterday-ish".into()),
            ..query()
        };
        let owner = Uuid::new_v4();
        let expected = AssetFilter {
            owner_id: owner,
            mime_type: None,
            tags: Vec::new(),
            created_window: None,
        };
        assert_eq!(AssetFilter::from_query(owner, &q, &Utc), expected);
    }

    #[test]
    fn mime_type_is_trimmed_but_kept_exact() {
        let q = AssetListQuery {
            mime_type: Some(" image/png ".into()),
            ..query()
        };
        let filter = AssetFilter::from_query(Uuid::nil(), &q, &Utc);
        assert_eq!(filter.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn plain_date_maps_to_local_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = calendar_day_window("2024-01-15", &tz).unwrap();
        assert_eq!(window.start, utc("2024-01-14T22:00:00Z"));
        assert_eq!(window.end, utc("2024-01-15T22:00:00Z"));
    }

    #[test]
    fn timestamp_is_read_in_local_zone() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        // 03:00 UTC on the 16th is still the 15th in UTC-5.
        let window = calendar_day_window("2024-01-16T03:00:00Z", &tz).unwrap();
        assert_eq!(window.start, utc("2024-01-15T05:00:00Z"));
        assert_eq!(window.end, utc("2024-01-16T05:00:00Z"));
    }

    #[test]
    fn naive_timestamp_is_accepted() {
        let window = calendar_day_window("2024-03-01T18:30:00", &Utc).unwrap();
        assert_eq!(window.start, utc("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        assert!(calendar_day_window("15/01/2024", &Utc).is_none());
        assert!(calendar_day_window("2024-02-30", &Utc).is_none());
        assert!(calendar_day_window("", &Utc).is_none());
    }
}

//! Facet statistics over the hit list of one search.

use std::collections::HashMap;

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::NaiveDate;
use serde::Deserialize;
use shared_types::{CategoryFacets, DateIndex, FacetGroups, Stats};

use crate::elastic::RawHit;

/// Engine-native publication format is `%a, %d %b %Y ...`, e.g.
/// `Wed, 04 Jan 2023 10:00:00 GMT`. Weekday and date are parsed apart.
const WEEKDAY_FORMAT: &str = "%a";
const DATE_FORMAT: &str = "%d %b %Y";
/// Length of the `Wed, 04 Jan 2023` prefix; the time of day is ignored.
const PUBLISHED_PREFIX_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("hit {id} has a malformed source: {source}")]
    MalformedHit {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("hit {id} has no publication date")]
    MissingTimestamp { id: String },
    #[error("hit {id} has an unparseable publication date {value:?}: {source}")]
    MalformedTimestamp {
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Publication timestamp as stored: a single string, or a list of which
/// only the first entry counts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Published {
    One(String),
    Many(Vec<String>),
}

impl Published {
    fn first(&self) -> Option<&str> {
        match self {
            Published::One(value) => Some(value),
            Published::Many(values) => values.first().map(String::as_str),
        }
    }
}

/// The source fields the aggregator reads.
#[derive(Debug, Deserialize)]
struct ArticleMeta {
    published: Published,
    region: String,
    language: String,
    #[serde(default)]
    keywords: Vec<String>,
}

impl ArticleMeta {
    fn from_hit(hit: &RawHit) -> Result<Self, StatsError> {
        ArticleMeta::deserialize(&hit.source).map_err(|source| StatsError::MalformedHit {
            id: hit.id.clone(),
            source,
        })
    }
}

/// Normalize an engine timestamp to `YYYY-MM-DD`.
///
/// The weekday must be a weekday name but is not checked against the date;
/// feeds occasionally carry a stale one.
pub fn normalize_date(published: &str) -> Result<String, chrono::ParseError> {
    let prefix = match published.char_indices().nth(PUBLISHED_PREFIX_LEN) {
        Some((end, _)) => &published[..end],
        None => published,
    };
    let (weekday, date) = prefix.split_once(", ").unwrap_or(("", prefix));
    format::parse(&mut Parsed::new(), weekday, StrftimeItems::new(WEEKDAY_FORMAT))?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Groups ids by key, remembering the order in which keys were first seen.
#[derive(Default)]
struct Grouper {
    index: HashMap<String, usize>,
    groups: Vec<(String, Vec<String>)>,
}

impl Grouper {
    fn push(&mut self, key: &str, id: &str) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.index.insert(key.to_string(), self.groups.len());
                self.groups.push((key.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.push(id.to_string());
    }

    /// Largest groups first; `sort_by` is stable, so ties keep first-seen order.
    fn into_sorted(self) -> FacetGroups {
        let mut groups = self.groups;
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        FacetGroups(groups)
    }
}

/// Build the region, language, category and date facets in one pass.
///
/// Any hit with a missing or unparseable publication date fails the whole
/// aggregation.
pub fn aggregate(hits: &[RawHit]) -> Result<Stats, StatsError> {
    let mut regions = Grouper::default();
    let mut languages = Grouper::default();
    let mut categories = Grouper::default();
    let mut dates: Vec<(String, String)> = Vec::with_capacity(hits.len());
    let mut date_slots: HashMap<&str, usize> = HashMap::with_capacity(hits.len());

    for hit in hits {
        let meta = ArticleMeta::from_hit(hit)?;
        let id = hit.id.as_str();

        let raw = meta
            .published
            .first()
            .ok_or_else(|| StatsError::MissingTimestamp { id: id.to_string() })?;
        let date = normalize_date(raw).map_err(|source| StatsError::MalformedTimestamp {
            id: id.to_string(),
            value: raw.to_string(),
            source,
        })?;
        // A repeated id keeps its first position and takes the latest date.
        match date_slots.get(id) {
            Some(&slot) => dates[slot].1 = date,
            None => {
                date_slots.insert(id, dates.len());
                dates.push((id.to_string(), date));
            }
        }

        regions.push(&meta.region, id);
        languages.push(&meta.language, id);
        for keyword in &meta.keywords {
            categories.push(keyword, id);
        }
    }

    // ISO dates compare correctly as strings.
    dates.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(Stats {
        articles_by_region: regions.into_sorted(),
        articles_by_language: languages.into_sorted(),
        articles_by_crime: CategoryFacets(categories.into_sorted()),
        articles_by_date: DateIndex(dates),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn hit(id: &str, source: Value) -> RawHit {
        RawHit {
            id: id.to_string(),
            source,
        }
    }

    fn article(id: &str, region: &str, language: &str, keywords: &[&str], published: &str) -> RawHit {
        hit(
            id,
            json!({
                "region": region,
                "language": language,
                "keywords": keywords,
                "published": [published],
                "content": "body text"
            }),
        )
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_date_truncates_time_of_day() {
        assert_eq!(
            normalize_date("Wed, 04 Jan 2023 10:22:01 GMT").unwrap(),
            "2023-01-04"
        );
        assert_eq!(normalize_date("Sun, 31 Dec 2017").unwrap(), "2017-12-31");
    }

    #[test]
    fn normalize_date_rejects_other_formats() {
        assert!(normalize_date("2023-01-04").is_err());
        assert!(normalize_date("").is_err());
        assert!(normalize_date("Wed, 04 Foo 2023 10:22:01").is_err());
        assert!(normalize_date("Xyz, 04 Jan 2023 10:22:01").is_err());
        assert!(normalize_date("04 Jan 2023 10:22:01 GMT").is_err());
    }

    #[test]
    fn normalize_date_ignores_mismatched_weekday() {
        // 4 January 2023 was a Wednesday.
        assert_eq!(
            normalize_date("Thu, 04 Jan 2023 10:00:00 GMT").unwrap(),
            "2023-01-04"
        );
    }

    #[test]
    fn mismatched_weekday_still_aggregates() {
        let hits = vec![article("a", "EU", "en", &[], "Thu, 04 Jan 2023 10:00:00 GMT")];
        let stats = aggregate(&hits).unwrap();
        assert_eq!(stats.articles_by_date.get("a"), Some("2023-01-04"));
    }

    #[test]
    fn two_article_scenario() {
        let hits = vec![
            article("a", "EU", "en", &["theft"], "Wed, 04 Jan 2023 08:00:00 GMT"),
            article("b", "EU", "fr", &["fraud", "theft"], "Wed, 01 Feb 2023 09:30:00 GMT"),
        ];
        let stats = aggregate(&hits).unwrap();

        assert_eq!(
            stats.articles_by_region,
            FacetGroups(vec![("EU".to_string(), ids(&["a", "b"]))])
        );
        assert_eq!(stats.articles_by_language.keys(), vec!["en", "fr"]);
        assert_eq!(stats.articles_by_crime.0.keys(), vec!["theft", "fraud"]);
        assert_eq!(stats.articles_by_crime.0.get("theft"), Some(&ids(&["a", "b"])[..]));
        assert_eq!(stats.articles_by_date.get("a"), Some("2023-01-04"));
        assert_eq!(stats.articles_by_date.ids(), vec!["b", "a"]);
    }

    #[test]
    fn groups_sorted_by_size_with_stable_ties() {
        let hits = vec![
            article("1", "EU", "en", &[], "Mon, 02 Jan 2023"),
            article("2", "ASIA", "en", &[], "Mon, 02 Jan 2023"),
            article("3", "US", "en", &[], "Mon, 02 Jan 2023"),
            article("4", "US", "en", &[], "Mon, 02 Jan 2023"),
            article("5", "AFRICA", "en", &[], "Mon, 02 Jan 2023"),
        ];
        let stats = aggregate(&hits).unwrap();
        assert_eq!(
            stats.articles_by_region.keys(),
            vec!["US", "EU", "ASIA", "AFRICA"]
        );
    }

    #[test]
    fn tie_order_follows_encounter_order() {
        let forward = vec![
            article("1", "EU", "en", &[], "Mon, 02 Jan 2023"),
            article("2", "US", "en", &[], "Mon, 02 Jan 2023"),
        ];
        let reversed: Vec<RawHit> = forward.iter().rev().cloned().collect();

        assert_eq!(aggregate(&forward).unwrap().articles_by_region.keys(), vec!["EU", "US"]);
        assert_eq!(aggregate(&reversed).unwrap().articles_by_region.keys(), vec!["US", "EU"]);
    }

    #[test]
    fn every_hit_lands_in_exactly_one_region_and_language() {
        let hits = vec![
            article("a", "EU", "en", &["x", "y", "z"], "Tue, 03 Jan 2023"),
            article("b", "US", "en", &[], "Tue, 03 Jan 2023"),
            article("c", "EU", "de", &["x"], "Tue, 03 Jan 2023"),
        ];
        let stats = aggregate(&hits).unwrap();

        let count = |groups: &FacetGroups| groups.0.iter().map(|(_, ids)| ids.len()).sum::<usize>();
        assert_eq!(count(&stats.articles_by_region), 3);
        assert_eq!(count(&stats.articles_by_language), 3);
        // multi-valued: one entry per keyword per document
        assert_eq!(count(&stats.articles_by_crime.0), 4);
    }

    #[test]
    fn dates_sorted_newest_first() {
        let hits = vec![
            article("old", "EU", "en", &[], "Fri, 01 Jan 2016"),
            article("new", "EU", "en", &[], "Thu, 05 Jan 2023"),
            article("mid", "EU", "en", &[], "Tue, 15 Jun 2021"),
        ];
        let stats = aggregate(&hits).unwrap();
        assert_eq!(stats.articles_by_date.ids(), vec!["new", "mid", "old"]);
    }

    #[test]
    fn published_may_be_plain_string() {
        let hits = vec![hit(
            "a",
            json!({ "region": "EU", "language": "en", "published": "Wed, 04 Jan 2023 08:00" }),
        )];
        let stats = aggregate(&hits).unwrap();
        assert_eq!(stats.articles_by_date.get("a"), Some("2023-01-04"));
        assert!(stats.articles_by_crime.0.is_empty());
    }

    #[test]
    fn malformed_timestamp_fails_the_request() {
        let hits = vec![
            article("a", "EU", "en", &[], "Wed, 04 Jan 2023"),
            article("b", "EU", "en", &[], "yesterday"),
        ];
        let err = aggregate(&hits).unwrap_err();
        match err {
            StatsError::MalformedTimestamp { id, value, .. } => {
                assert_eq!(id, "b");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_published_list_is_an_error() {
        let hits = vec![hit(
            "a",
            json!({ "region": "EU", "language": "en", "published": [] }),
        )];
        assert!(matches!(
            aggregate(&hits).unwrap_err(),
            StatsError::MissingTimestamp { .. }
        ));
    }

    #[test]
    fn missing_region_is_a_malformed_hit() {
        let hits = vec![hit(
            "a",
            json!({ "language": "en", "published": "Wed, 04 Jan 2023" }),
        )];
        assert!(matches!(
            aggregate(&hits).unwrap_err(),
            StatsError::MalformedHit { .. }
        ));
    }

    #[test]
    fn no_hits_gives_empty_stats() {
        assert_eq!(aggregate(&[]).unwrap(), Stats::default());
    }
}

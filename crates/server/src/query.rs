//! Composition of the Elasticsearch request body for `/api/search`.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::filters::SearchFilters;
use crate::taxonomy::CategoryTaxonomy;

/// Full article text, target of the phrase match.
pub const CONTENT_FIELD: &str = "content";
/// Exact-value subfield of the article keywords.
pub const KEYWORDS_FIELD: &str = "keywords.keyword";
pub const REGION_FIELD: &str = "region";
pub const PUBLISHED_FIELD: &str = "published";

/// Lower year bound used when only `to` is given.
pub const FIRST_YEAR: &str = "2000";
/// Upper year bound used when only `from` is given.
pub const LAST_YEAR: &str = "2100";

/// One mandatory clause of the `bool.must` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    MatchPhrase {
        field: &'static str,
        query: String,
    },
    Terms {
        field: &'static str,
        values: Vec<String>,
    },
    Range {
        field: &'static str,
        gte: String,
        lte: String,
    },
}

impl Clause {
    fn to_json(&self) -> Value {
        match self {
            Clause::MatchPhrase { field, query } => json!({ "match_phrase": { *field: query } }),
            Clause::Terms { field, values } => json!({ "terms": { *field: values } }),
            Clause::Range { field, gte, lte } => {
                json!({ "range": { *field: { "gte": gte, "lte": lte } } })
            }
        }
    }
}

/// Engine request body: ordered mandatory clauses plus a result bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredQuery {
    pub must: Vec<Clause>,
    pub size: i64,
}

impl StructuredQuery {
    /// Wire form. `size` is sent as a string, which the cluster accepts and
    /// existing deployments rely on.
    pub fn to_json(&self) -> Value {
        let must: Vec<Value> = self.must.iter().map(Clause::to_json).collect();
        json!({
            "size": self.size.to_string(),
            "query": { "bool": { "must": must } }
        })
    }

    pub fn range(&self) -> Option<(&str, &str)> {
        self.must.iter().find_map(|clause| match clause {
            Clause::Range { gte, lte, .. } => Some((gte.as_str(), lte.as_str())),
            _ => None,
        })
    }
}

impl Serialize for StructuredQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A built query together with the category labels it could not resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub query: StructuredQuery,
    pub unknown_categories: Vec<String>,
}

/// Builds [`StructuredQuery`] values against a category taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    taxonomy: &'a CategoryTaxonomy,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(taxonomy: &'a CategoryTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn from_filters(&self, filters: &SearchFilters) -> BuiltQuery {
        self.build(
            &filters.query,
            filters.categories.as_deref(),
            filters.regions.as_deref(),
            filters.from.as_deref(),
            filters.to.as_deref(),
            filters.size,
        )
    }

    /// Compose the clause list in a fixed order: phrase match, keyword
    /// terms, region terms, date range.
    ///
    /// A category list whose labels are all unknown still adds an empty
    /// keyword filter, so the search matches nothing rather than
    /// everything.
    pub fn build(
        &self,
        query: &str,
        categories: Option<&[String]>,
        regions: Option<&[String]>,
        from: Option<&str>,
        to: Option<&str>,
        size: i64,
    ) -> BuiltQuery {
        let mut must = vec![Clause::MatchPhrase {
            field: CONTENT_FIELD,
            query: query.to_string(),
        }];
        let mut unknown_categories = Vec::new();

        if let Some(categories) = categories {
            let resolution = self.taxonomy.resolve(categories);
            unknown_categories = resolution.unknown;
            must.push(Clause::Terms {
                field: KEYWORDS_FIELD,
                values: resolution.keywords,
            });
        }

        if let Some(regions) = regions {
            must.push(Clause::Terms {
                field: REGION_FIELD,
                values: regions.to_vec(),
            });
        }

        if let Some(range) = date_range(from, to) {
            must.push(range);
        }

        BuiltQuery {
            query: StructuredQuery { must, size },
            unknown_categories,
        }
    }
}

/// Year-granularity range over `published`; `None` when neither bound is set.
/// Bounds are not reordered: `from > to` simply matches nothing.
fn date_range(from: Option<&str>, to: Option<&str>) -> Option<Clause> {
    let (gte, lte) = match (from.map(year), to.map(year)) {
        (None, None) => return None,
        (Some(from), None) => (from, LAST_YEAR.to_string()),
        (None, Some(to)) => (FIRST_YEAR.to_string(), to),
        (Some(from), Some(to)) => (from, to),
    };
    Some(Clause::Range {
        field: PUBLISHED_FIELD,
        gte,
        lte,
    })
}

/// Only the leading four characters of a date bound are significant.
fn year(date: &str) -> String {
    date.chars().take(4).collect()
}

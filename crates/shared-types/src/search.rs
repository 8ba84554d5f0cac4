use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/search`.
///
/// Everything arrives as raw text; the server normalizes malformed values
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct SearchParams {
    /// Free-text phrase matched against the article content. Required.
    pub q: Option<String>,
    /// Lower date bound; only the year is significant.
    pub from: Option<String>,
    /// Upper date bound; only the year is significant.
    pub to: Option<String>,
    /// Maximum number of hits to aggregate.
    pub size: Option<String>,
    /// Bracketed category list, e.g. `[theft, fraud]`.
    pub keywords: Option<String>,
    /// Bracketed region list, e.g. `[EU, US]`.
    pub regions: Option<String>,
}

/// Query parameters for `GET /api/selected`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct SelectedParams {
    /// Bracketed identifier list, optionally quoted: `["id1","id2"]`. Required.
    pub ids: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Documents per page.
    pub size: Option<String>,
}

// ---------------------------------------------------------------------------
// Facet containers
// ---------------------------------------------------------------------------

/// Document identifiers grouped by facet key, kept in presentation order.
///
/// Serialized as a JSON object whose key order is the order of the groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetGroups(pub Vec<(String, Vec<String>)>);

impl FacetGroups {
    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, ids)| ids.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FacetGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, ids) in &self.0 {
            map.serialize_entry(key, ids)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FacetGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedMapVisitor::<Vec<String>>::new())
            .map(FacetGroups)
    }
}

/// Category facet: same grouping as [`FacetGroups`] but serialized as an
/// array of single-key objects, `[{"theft": ["a", "b"]}, {"fraud": ["b"]}]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFacets(pub FacetGroups);

impl Serialize for CategoryFacets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let groups = &(self.0).0;
        let mut seq = serializer.serialize_seq(Some(groups.len()))?;
        for (key, ids) in groups {
            seq.serialize_element(&SingleEntry(key, ids))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for CategoryFacets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Vec<(String, Vec<String>)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of single-key objects")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::new();
                while let Some(entry) = seq.next_element::<FacetGroups>()? {
                    groups.extend(entry.0);
                }
                Ok(groups)
            }
        }

        deserializer
            .deserialize_seq(EntriesVisitor)
            .map(|groups| CategoryFacets(FacetGroups(groups)))
    }
}

struct SingleEntry<'a>(&'a str, &'a [String]);

impl Serialize for SingleEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

/// Document identifier → normalized `YYYY-MM-DD` date, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateIndex(pub Vec<(String, String)>);

impl DateIndex {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, date)| date.as_str())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|(id, _)| id.as_str()).collect()
    }
}

impl Serialize for DateIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, date) in &self.0 {
            map.serialize_entry(id, date)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DateIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedMapVisitor::<String>::new())
            .map(DateIndex)
    }
}

/// Collects a JSON object into a vector without reordering its keys.
struct OrderedMapVisitor<V>(std::marker::PhantomData<V>);

impl<V> OrderedMapVisitor<V> {
    fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Facet statistics derived from the hits of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Stats {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub articles_by_region: FacetGroups,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub articles_by_language: FacetGroups,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub articles_by_crime: CategoryFacets,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub articles_by_date: DateIndex,
}

/// Why a request parameter did not contribute to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DiagnosticCode {
    /// A list filter was not in `[a, b]` form and was dropped.
    #[serde(rename = "MALFORMED_FILTER_IGNORED")]
    MalformedFilterIgnored,
    /// A category has no entry in the keyword taxonomy.
    #[serde(rename = "UNKNOWN_CATEGORY")]
    UnknownCategory,
}

/// One silently-normalized input, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub parameter: String,
    pub value: String,
}

/// Response body of `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchResponse {
    pub query: String,
    pub search_from: String,
    pub search_to: String,
    pub total_results: u64,
    pub articles_count: usize,
    pub stats: Stats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Response body of `GET /api/selected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SelectedResponse {
    pub page_num: u64,
    /// Number of documents actually returned on this page.
    pub per_page: usize,
    pub total_pages: u64,
    pub total_results: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub results: Vec<serde_json::Map<String, serde_json::Value>>,
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Failure to load the keyword taxonomy at startup.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("failed to read keyword categories from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse keyword categories from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Static mapping from a category label to the keyword terms indexed for it.
///
/// Loaded once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct CategoryTaxonomy {
    categories: HashMap<String, Vec<String>>,
}

/// Keywords resolved for a category list, plus the labels that had no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub keywords: Vec<String>,
    pub unknown: Vec<String>,
}

impl CategoryTaxonomy {
    pub fn new(categories: HashMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    /// Read a JSON object of the form `{"category": ["keyword", ...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let categories =
            serde_json::from_str(&contents).map_err(|source| TaxonomyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Concatenate the keywords of each category in input order, without
    /// deduplication. Unknown labels contribute nothing and are reported in
    /// [`Resolution::unknown`].
    pub fn resolve(&self, categories: &[String]) -> Resolution {
        let mut resolution = Resolution::default();
        for category in categories {
            match self.categories.get(category) {
                Some(keywords) => resolution.keywords.extend(keywords.iter().cloned()),
                None => resolution.unknown.push(category.clone()),
            }
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> CategoryTaxonomy {
        let mut categories = HashMap::new();
        categories.insert(
            "theft".to_string(),
            vec!["theft".to_string(), "burglary".to_string()],
        );
        categories.insert(
            "fraud".to_string(),
            vec!["fraud".to_string(), "scam".to_string(), "theft".to_string()],
        );
        CategoryTaxonomy::new(categories)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_preserves_input_order_without_dedup() {
        let resolution = taxonomy().resolve(&strings(&["fraud", "theft"]));
        assert_eq!(
            resolution.keywords,
            strings(&["fraud", "scam", "theft", "theft", "burglary"])
        );
        assert!(resolution.unknown.is_empty());
    }

    #[test]
    fn unknown_category_is_reported_not_fatal() {
        let resolution = taxonomy().resolve(&strings(&["arson", "theft", "piracy"]));
        assert_eq!(resolution.keywords, strings(&["theft", "burglary"]));
        assert_eq!(resolution.unknown, strings(&["arson", "piracy"]));
    }

    #[test]
    fn repeated_category_repeats_keywords() {
        let resolution = taxonomy().resolve(&strings(&["theft", "theft"]));
        assert_eq!(
            resolution.keywords,
            strings(&["theft", "burglary", "theft", "burglary"])
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CategoryTaxonomy::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, TaxonomyError::Io { .. }));
    }

    #[test]
    fn load_parses_shipped_taxonomy() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../static/en_keyword_categories.json");
        let taxonomy = CategoryTaxonomy::load(path).unwrap();
        assert!(!taxonomy.is_empty());
    }
}

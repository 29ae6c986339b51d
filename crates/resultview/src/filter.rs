//! Text filtering over event paths.
//!
//! A compiled matcher tests both the full path and its leaf name (the final
//! `/`-delimited segment). Invalid regex patterns fail open: the filter
//! compiles to a pass-all matcher instead of surfacing an error.

use regex::RegexBuilder;

/// Options controlling how a filter query is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub case_sensitive: bool,
    pub use_regex: bool,
}

/// A compiled path filter.
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Matches everything. Produced by empty queries and invalid patterns.
    All,
    Substring {
        needle: String,
        case_sensitive: bool,
    },
    Pattern(regex::Regex),
}

impl EventFilter {
    /// Compiles a query into a matcher.
    ///
    /// Empty or whitespace-only queries match everything. In regex mode an
    /// unparsable pattern also compiles to [`EventFilter::All`].
    pub fn compile(query: &str, options: &FilterOptions) -> Self {
        let query = query.trim();
        if query.is_empty() {
            return Self::All;
        }

        if options.use_regex {
            return match RegexBuilder::new(query)
                .case_insensitive(!options.case_sensitive)
                .build()
            {
                Ok(pattern) => Self::Pattern(pattern),
                Err(error) => {
                    log::debug!("event filter pattern rejected, matching all: {error}");
                    Self::All
                }
            };
        }

        let needle = if options.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        Self::Substring {
            needle,
            case_sensitive: options.case_sensitive,
        }
    }

    /// Returns true if the filter matches everything.
    #[inline]
    pub fn is_pass_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Tests a path. A hit on either the full path or the leaf name counts.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Pattern(pattern) => {
                pattern.is_match(path) || pattern.is_match(leaf_name(path))
            }
            Self::Substring {
                needle,
                case_sensitive,
            } => {
                let name = leaf_name(path);
                if *case_sensitive {
                    path.contains(needle.as_str()) || name.contains(needle.as_str())
                } else {
                    path.to_lowercase().contains(needle.as_str())
                        || name.to_lowercase().contains(needle.as_str())
                }
            }
        }
    }
}

/// Returns the final path-separator-delimited segment of a path.
pub(crate) fn leaf_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

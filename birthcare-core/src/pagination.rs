//! List paging, sorting and filtering

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sort order of a list column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Filters shared by every list screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Page, sort and filter state of a list screen.
///
/// Every change other than an explicit page move sends the list back to
/// page 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    #[serde(flatten)]
    pub filters: ListFilters,
}

/// Default rows per page
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound accepted for per_page
pub const MAX_PER_PAGE: u32 = 100;

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sort_field: None,
            sort_direction: SortDirection::default(),
            filters: ListFilters::default(),
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Floors at 1. The upper bound is left to `clamp_to` once `last_page` is known.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.filters.status = status.filter(|s| !s.trim().is_empty());
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.filters.search = (!search.trim().is_empty()).then_some(search);
        self.page = 1;
    }

    /// Sorting by the current field again flips the direction
    pub fn set_sort(&mut self, field: impl Into<String>) {
        let field = field.into();
        if self.sort_field.as_deref() == Some(field.as_str()) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = Some(field);
            self.sort_direction = SortDirection::Asc;
        }
        self.page = 1;
    }

    /// Keep the page inside `1..=last_page`
    pub fn clamp_to(&mut self, last_page: u32) {
        self.page = self.page.clamp(1, last_page.max(1));
    }

    /// Query parameters sent to the backend
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(ref field) = self.sort_field {
            pairs.push(("sort_field", field.clone()));
            pairs.push(("sort_direction", self.sort_direction.as_str().to_string()));
        }
        if let Some(ref status) = self.filters.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(ref search) = self.filters.search
            && !search.trim().is_empty()
        {
            pairs.push(("search", search.trim().to_string()));
        }
        pairs
    }

    /// Encoded query string, without the leading `?`
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a list query from a URL query string.
    ///
    /// Unknown keys are ignored; malformed numbers fall back to defaults.
    pub fn parse(query_string: &str) -> Result<Self, String> {
        let mut query = Self::default();

        for pair in query_string.split('&').filter(|p| !p.is_empty()) {
            let parts: Vec<&str> = pair.splitn(2, '=').collect();
            if parts.len() != 2 {
                continue;
            }

            let key = urlencoding::decode(parts[0]).map_err(|e| e.to_string())?;
            let value = urlencoding::decode(&parts[1].replace('+', " "))
                .map_err(|e| e.to_string())?
                .into_owned();

            match key.as_ref() {
                "page" => query.page = value.parse::<u32>().unwrap_or(1).max(1),
                "per_page" => {
                    query.per_page = value
                        .parse::<u32>()
                        .unwrap_or(DEFAULT_PER_PAGE)
                        .clamp(1, MAX_PER_PAGE)
                }
                "sort_field" if !value.is_empty() => query.sort_field = Some(value),
                "sort_direction" => {
                    query.sort_direction = match value.as_str() {
                        "asc" => SortDirection::Asc,
                        "desc" => SortDirection::Desc,
                        other => return Err(format!("Invalid sort_direction: {}", other)),
                    }
                }
                "status" if !value.is_empty() => query.filters.status = Some(value),
                "search" if !value.trim().is_empty() => query.filters.search = Some(value),
                _ => {}
            }
        }

        Ok(query)
    }
}

/// Backend list envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_last_page")]
    pub last_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

fn default_last_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            last_page: self.last_page,
            current_page: self.current_page,
            per_page: self.per_page,
        }
    }
}

/// Default quiet period before a search fires
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One search-result card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingListingItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub metadata_items: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_simple_application: bool,
}

/// A job posting's detail page.
///
/// `external_url` is only ever set for open postings that redirect to an
/// external application flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingInfo {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_slug: Option<String>,
    #[serde(default)]
    pub is_simple_application: bool,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub hirers: Vec<Hirer>,
}

impl JobPostingInfo {
    /// Empty open posting with only its id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: None,
            location: None,
            description: None,
            skills: Vec::new(),
            company_name: None,
            company_slug: None,
            is_simple_application: false,
            external_url: None,
            disabled: false,
            hirers: Vec::new(),
        }
    }

    /// Terminal marker for a posting that no longer exists.
    pub fn unavailable(id: u64) -> Self {
        Self {
            disabled: true,
            ..Self::new(id)
        }
    }

    /// Attach an external application URL, honouring the invariant that
    /// simple-application and disabled postings never carry one.
    pub fn with_external_url(mut self, url: Option<String>) -> Self {
        self.external_url = if self.disabled || self.is_simple_application {
            None
        } else {
            url
        };
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub headquarters: Option<String>,
}

/// A recruiter, either from a job posting's hirer block or a profile page.
/// Which fields are present depends on where it was extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hirer {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// "Date posted" options of the search filter, in dropdown order below the
/// default entry. No filter at all is `SearchQuery::date_filter == None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateFilter {
    PastDay,
    PastWeek,
    PastMonth,
}

impl DateFilter {
    /// Arrow-down presses needed to reach this option from the default entry.
    pub fn arrow_presses(self) -> u32 {
        match self {
            DateFilter::PastDay => 1,
            DateFilter::PastWeek => 2,
            DateFilter::PastMonth => 3,
        }
    }

    pub fn from_arrow_presses(n: u32) -> Option<Self> {
        match n {
            1 => Some(DateFilter::PastDay),
            2 => Some(DateFilter::PastWeek),
            3 => Some(DateFilter::PastMonth),
            _ => None,
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateFilter::PastDay => "day",
            DateFilter::PastWeek => "week",
            DateFilter::PastMonth => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "24h" | "past-day" => Ok(DateFilter::PastDay),
            "week" | "past-week" => Ok(DateFilter::PastWeek),
            "month" | "past-month" => Ok(DateFilter::PastMonth),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(DateFilter::from_arrow_presses)
                .ok_or_else(|| format!("unknown date filter `{other}` (day|week|month)")),
        }
    }
}

/// A job search request; not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    pub location: String,
    #[serde(default)]
    pub date_filter: Option<DateFilter>,
    #[serde(default)]
    pub limit_to_first_page: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: location.into(),
            date_filter: None,
            limit_to_first_page: false,
        }
    }

    pub fn first_page_only(mut self) -> Self {
        self.limit_to_first_page = true;
        self
    }

    pub fn posted_within(mut self, filter: DateFilter) -> Self {
        self.date_filter = Some(filter);
        self
    }
}

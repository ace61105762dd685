use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Format of the `uploaded_at` search parameter.
pub const UPLOAD_DATE_FORMAT: &str = "%d-%m-%Y";

/// Content type categories the search endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentCategory {
    #[default]
    All,
    Pdf,
    Image,
    Document,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::All => "all",
            ContentCategory::Pdf => "pdf",
            ContentCategory::Image => "image",
            ContentCategory::Document => "document",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ContentCategory::All),
            "pdf" => Ok(ContentCategory::Pdf),
            "image" => Ok(ContentCategory::Image),
            "document" => Ok(ContentCategory::Document),
            other => Err(Error::Validation(format!(
                "unknown content type '{}', expected one of all, pdf, image, document",
                other
            ))),
        }
    }
}

/// Query parameters of the file listing.
///
/// Empty fields are absent; a filter with every field absent is the same
/// as no filter at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    file_name: Option<String>,
    uploaded_at: Option<NaiveDate>,
    content_type: ContentCategory,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter out of raw form values, the way a search box hands
    /// them over: empty strings are absent, the date is `dd-MM-yyyy`.
    pub fn from_form(file_name: &str, uploaded_at: &str, content_type: &str) -> Result<Self> {
        let mut filter = Self::new().file_name(file_name);
        if !uploaded_at.trim().is_empty() {
            filter = filter.uploaded_at(parse_upload_date(uploaded_at)?);
        }

        Ok(filter.content_type(content_type.parse()?))
    }

    pub fn file_name<S: Into<String>>(mut self, name: S) -> Self {
        let name = name.into();
        self.file_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn uploaded_at(mut self, date: NaiveDate) -> Self {
        self.uploaded_at = Some(date);
        self
    }

    pub fn content_type(mut self, category: ContentCategory) -> Self {
        self.content_type = category;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.uploaded_at
    }

    pub fn category(&self) -> ContentCategory {
        self.content_type
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.is_none()
            && self.uploaded_at.is_none()
            && self.content_type == ContentCategory::All
    }

    /// The non-empty fields as search query parameters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(name) = &self.file_name {
            pairs.push(("file_name", name.clone()));
        }
        if let Some(date) = &self.uploaded_at {
            pairs.push(("uploaded_at", date.format(UPLOAD_DATE_FORMAT).to_string()));
        }
        if self.content_type != ContentCategory::All {
            pairs.push(("content_type", self.content_type.to_string()));
        }

        pairs
    }
}

pub fn parse_upload_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), UPLOAD_DATE_FORMAT).map_err(|_| {
        Error::Validation(format!(
            "invalid upload date '{}', expected dd-mm-yyyy",
            value
        ))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_filters() {
        assert!(SearchFilter::new().is_empty());
        assert!(SearchFilter::from_form("", "", "").unwrap().is_empty());
        assert!(SearchFilter::from_form("", "", "all").unwrap().is_empty());
        assert!(SearchFilter::new()
            .file_name("")
            .content_type(ContentCategory::All)
            .is_empty());
        assert!(SearchFilter::new().query_pairs().is_empty());
    }

    #[test]
    fn only_present_fields() {
        let filter = SearchFilter::from_form("report", "", "all").unwrap();
        assert_eq!(filter.query_pairs(), vec![("file_name", "report".to_string())]);

        let filter = SearchFilter::from_form("", "05-03-2024", "pdf").unwrap();
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("uploaded_at", "05-03-2024".to_string()),
                ("content_type", "pdf".to_string())
            ]
        );
        assert_eq!(filter.date(), NaiveDate::from_ymd_opt(2024, 3, 5));

        let filter = SearchFilter::from_form("a", "31-12-2023", "Image").unwrap();
        assert_eq!(filter.query_pairs().len(), 3);
        assert_eq!(filter.category(), ContentCategory::Image);
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(
            SearchFilter::from_form("", "2024-01-01", ""),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            SearchFilter::from_form("", "", "video"),
            Err(Error::Validation(_))
        ));
        assert!(parse_upload_date("31-02-2024").is_err());
    }
}

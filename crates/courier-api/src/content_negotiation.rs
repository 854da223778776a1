//! Content negotiation support
//!
//! Parses the `Accept` header into quality-ranked mime types and picks the
//! best one among the formats the caller can produce.

use std::cmp::Ordering;

// ============================================================================
// Mime Quality
// ============================================================================

/// A mime type with the client's preference weight
#[derive(Debug, Clone, PartialEq)]
pub struct MimeQuality {
    /// Lowercased mime type, e.g. "application/json"
    pub mime: String,
    /// Quality value (0.0 - 1.0); 0 marks an explicitly rejected type
    pub quality: f32,
}

impl MimeQuality {
    /// Parse one already-normalized `Accept` entry (`type/sub` or `type/sub;q=X`)
    ///
    /// Entries without `;q=` keep their whole text as the mime type and get
    /// quality 1. An unreadable quality also counts as 1.
    pub fn parse(entry: &str) -> Option<Self> {
        let (mime, quality) = match entry.split_once(";q=") {
            Some((mime, q)) => {
                let quality = q
                    .parse::<f32>()
                    .ok()
                    .filter(|q| q.is_finite())
                    .map(|q| q.clamp(0.0, 1.0))
                    .unwrap_or(1.0);
                (mime, quality)
            }
            None => (entry, 1.0),
        };

        if mime.is_empty() {
            return None;
        }

        Some(Self {
            mime: mime.to_string(),
            quality,
        })
    }

    /// Check if the client explicitly refused this type
    pub fn is_rejected(&self) -> bool {
        self.quality == 0.0
    }
}

// ============================================================================
// Accept Header
// ============================================================================

/// Parsed Accept header
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
    /// Entries sorted by descending quality, unique per mime type
    pub entries: Vec<MimeQuality>,
}

impl AcceptHeader {
    /// Parse an Accept header value
    ///
    /// Spaces are stripped and the header is lowercased before splitting on
    /// commas. A repeated mime type overwrites the quality of its first
    /// occurrence. The sort is stable, so equal qualities keep header order.
    pub fn parse(header: &str) -> Self {
        let normalized = header.to_lowercase().replace(' ', "");
        let mut entries: Vec<MimeQuality> = Vec::new();

        for parsed in normalized.split(',').filter_map(MimeQuality::parse) {
            match entries.iter_mut().find(|e| e.mime == parsed.mime) {
                Some(existing) => existing.quality = parsed.quality,
                None => entries.push(parsed),
            }
        }

        entries.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));

        Self { entries }
    }

    /// Get the most preferred entry, rejected or not
    pub fn preferred(&self) -> Option<&MimeQuality> {
        self.entries.first()
    }

    /// Get quality for a specific mime type (0 when not listed)
    pub fn quality_for(&self, mime: &str) -> f32 {
        let mime = mime.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.mime == mime)
            .map(|e| e.quality)
            .unwrap_or(0.0)
    }

    /// Select the highest ranked, non-rejected entry the caller supports
    pub fn best_supported(&self, candidates: &[&str]) -> Option<&str> {
        let candidates: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();

        self.entries
            .iter()
            .find(|e| !e.is_rejected() && candidates.contains(&e.mime))
            .map(|e| e.mime.as_str())
    }
}

/// Negotiate a mime type from an optional `Accept` header
///
/// Returns `None` when the header is absent or names none of the candidates;
/// the caller picks its default then.
pub fn negotiate(accept: Option<&str>, candidates: &[&str]) -> Option<String> {
    let header = AcceptHeader::parse(accept?);
    header.best_supported(candidates).map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: [&str; 2] = ["application/json", "application/xml"];

    #[test]
    fn test_mime_quality_parse() {
        let m = MimeQuality::parse("application/json").unwrap();
        assert_eq!(m.mime, "application/json");
        assert_eq!(m.quality, 1.0);

        let m = MimeQuality::parse("text/html;q=0.4").unwrap();
        assert_eq!(m.mime, "text/html");
        assert_eq!(m.quality, 0.4);

        let m = MimeQuality::parse("text/html;q=7").unwrap();
        assert_eq!(m.quality, 1.0);

        let m = MimeQuality::parse("text/html;q=abc").unwrap();
        assert_eq!(m.quality, 1.0);

        assert!(MimeQuality::parse("").is_none());
    }

    #[test]
    fn test_accept_header_sorted_by_quality() {
        let accept = AcceptHeader::parse("text/html;q=0.5, application/xml;q=0.9, image/png");
        let mimes: Vec<_> = accept.entries.iter().map(|e| e.mime.as_str()).collect();
        assert_eq!(mimes, vec!["image/png", "application/xml", "text/html"]);
        assert_eq!(accept.preferred().unwrap().mime, "image/png");
    }

    #[test]
    fn test_accept_header_duplicates_overwrite() {
        let accept = AcceptHeader::parse("application/json;q=0.8,text/plain,application/json;q=0.2");
        assert_eq!(accept.entries.len(), 2);
        assert_eq!(accept.quality_for("application/json"), 0.2);
        assert_eq!(accept.quality_for("image/gif"), 0.0);
    }

    #[test]
    fn test_quality_decides_over_order() {
        let chosen = negotiate(
            Some("application/xml;q=0.9,application/json;q=1.0"),
            &CANDIDATES,
        );
        assert_eq!(chosen.as_deref(), Some("application/json"));

        let chosen = negotiate(Some("application/json;q=0.3, application/xml"), &CANDIDATES);
        assert_eq!(chosen.as_deref(), Some("application/xml"));
    }

    #[test]
    fn test_unsupported_or_missing_header() {
        assert_eq!(negotiate(Some("text/plain"), &CANDIDATES), None);
        assert_eq!(negotiate(None, &CANDIDATES), None);
    }

    #[test]
    fn test_rejected_type_is_skipped() {
        let chosen = negotiate(
            Some("application/xml;q=0, application/json;q=0.1"),
            &CANDIDATES,
        );
        assert_eq!(chosen.as_deref(), Some("application/json"));

        assert_eq!(negotiate(Some("application/json;q=0"), &CANDIDATES), None);
    }

    #[test]
    fn test_case_and_spaces_are_normalized() {
        let chosen = negotiate(Some("Application/XML ; q=0.7"), &["APPLICATION/xml"]);
        assert_eq!(chosen.as_deref(), Some("application/xml"));
    }
}

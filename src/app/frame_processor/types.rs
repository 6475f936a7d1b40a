// SPDX-License-Identifier: GPL-3.0-only

//! Decode result types
//!
//! A decode result is the raw text payload; interpretation (URL vs plain
//! text) only decides which actions the result dialog offers.

/// Action derived from QR code content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrAction {
    /// URL that can be opened in a browser
    Url(String),
    /// Plain text that can be copied to the clipboard
    Text(String),
}

impl QrAction {
    /// Parse QR code content into an action.
    ///
    /// Recognizes explicit http(s) URLs and common scheme-less domains;
    /// everything else is plain text.
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Self::Url(trimmed.to_string());
        }

        // Scheme-less domains: "www.example.org", "example.com"
        if trimmed.contains('.') && !trimmed.contains(' ') && trimmed.len() < 256 {
            if trimmed.starts_with("www.")
                || trimmed.ends_with(".com")
                || trimmed.ends_with(".org")
                || trimmed.ends_with(".net")
                || trimmed.ends_with(".io")
            {
                return Self::Url(format!("https://{}", trimmed));
            }
        }

        Self::Text(trimmed.to_string())
    }
}

/// A decoded QR payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrDetection {
    /// Raw content decoded from the QR code, byte-for-byte
    pub content: String,
    /// Parsed action based on content type
    pub action: QrAction,
}

impl QrDetection {
    pub fn new(content: String) -> Self {
        let action = QrAction::parse(&content);
        Self { content, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url() {
        assert!(matches!(
            QrAction::parse("https://example.com"),
            QrAction::Url(_)
        ));
        assert!(matches!(
            QrAction::parse("http://example.com/path?q=1"),
            QrAction::Url(_)
        ));
    }

    #[test]
    fn parse_schemeless_domain() {
        match QrAction::parse("www.example.org") {
            QrAction::Url(url) => assert_eq!(url, "https://www.example.org"),
            other => panic!("expected Url, got {:?}", other),
        }
    }

    #[test]
    fn parse_plain_text() {
        assert!(matches!(QrAction::parse("Hello World!"), QrAction::Text(_)));
        // Contains a dot but reads like a sentence
        assert!(matches!(
            QrAction::parse("meet me at 5 p.m. sharp"),
            QrAction::Text(_)
        ));
    }

    #[test]
    fn detection_preserves_raw_content() {
        let detection = QrDetection::new("  https://example.com  ".to_string());
        assert_eq!(detection.content, "  https://example.com  ");
        assert_eq!(
            detection.action,
            QrAction::Url("https://example.com".to_string())
        );
    }
}

//! Storage API deep-listing document.

use serde::Deserialize;

use crate::error::FetchError;

/// Response envelope of `GET /api/storage/<repo>/?list&deep=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    /// Listed tree (e.g. `https://repo.example.org/api/storage/releases`).
    #[serde(default)]
    pub uri: Option<String>,
    /// Listing creation timestamp as sent by the server.
    #[serde(default)]
    pub created: Option<String>,
    pub files: Vec<FileRecord>,
}

/// One file entry. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRecord {
    /// Repository-relative path with a leading `/`.
    #[serde(rename = "uri")]
    pub path: String,
    #[serde(default)]
    pub sha1: Option<String>,
    /// Absent for artifacts published before SHA-256 was recorded.
    #[serde(default, rename = "sha2")]
    pub sha256: Option<String>,
}

pub fn parse_listing(body: &[u8]) -> Result<Listing, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_and_ignores_extra_fields() {
        let body = br#"{
            "uri": "https://repo.example.org/api/storage/releases",
            "created": "2023-06-01T12:00:00.000Z",
            "files": [
                {
                    "uri": "/org/jenkins-ci/plugins/foo/1.0/foo-1.0.hpi",
                    "size": 1024,
                    "lastModified": "2015-01-01T00:00:00.000Z",
                    "folder": false,
                    "sha1": "111",
                    "sha2": "222",
                    "mdTimestamps": { "properties": "2015-01-01T00:00:00.000Z" }
                }
            ]
        }"#;
        let listing = parse_listing(body).unwrap();
        assert_eq!(listing.created.as_deref(), Some("2023-06-01T12:00:00.000Z"));
        assert_eq!(listing.files.len(), 1);
        let f = &listing.files[0];
        assert_eq!(f.path, "/org/jenkins-ci/plugins/foo/1.0/foo-1.0.hpi");
        assert_eq!(f.sha1.as_deref(), Some("111"));
        assert_eq!(f.sha256.as_deref(), Some("222"));
    }

    #[test]
    fn missing_or_null_sha2_is_none() {
        let body = br#"{"files": [
            { "uri": "/a/b/1/b-1.hpi", "sha1": "aa" },
            { "uri": "/a/c/1/c-1.hpi", "sha1": "bb", "sha2": null }
        ]}"#;
        let listing = parse_listing(body).unwrap();
        assert!(listing.files.iter().all(|f| f.sha256.is_none()));
        assert!(listing.uri.is_none());
    }

    #[test]
    fn missing_files_array_is_malformed() {
        let err = parse_listing(br#"{"uri": "x"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_listing(b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}

//! Utility functions and helpers.

pub mod clock;
pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Parse a base URL, forcing it to be treated as a directory.
pub fn base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

/// Resolve an API path under the base directory.
///
/// Every segment is percent-encoded on its own, so `/`, `?`, `#` and `%`
/// inside a job id or spider name stay within that segment. Empty and dot
/// segments are rejected.
pub fn resolve_endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| AppError::config(format!("base URL {base} cannot hold a path")))?;
        path.pop_if_empty();
        for segment in segments {
            if matches!(*segment, "" | "." | "..") {
                return Err(AppError::InvalidArgument(format!(
                    "'{segment}' is not a valid path segment"
                )));
            }
            path.push(segment);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_adds_trailing_slash() {
        assert_eq!(
            base_url("https://api.example.com/v1").unwrap().as_str(),
            "https://api.example.com/v1/"
        );
        assert_eq!(
            base_url("https://api.example.com/v1/").unwrap().as_str(),
            "https://api.example.com/v1/"
        );
    }

    #[test]
    fn test_resolve_endpoint() {
        let base = base_url("https://api.example.com/api/v1").unwrap();
        assert_eq!(
            resolve_endpoint(&base, &["jobs", "list"]).unwrap().as_str(),
            "https://api.example.com/api/v1/jobs/list"
        );
        assert_eq!(
            resolve_endpoint(&base, &["jobs", "abc", "logs"]).unwrap().as_str(),
            "https://api.example.com/api/v1/jobs/abc/logs"
        );
    }

    #[test]
    fn test_resolve_endpoint_encodes_segments() {
        let base = base_url("https://api.example.com/api/v1").unwrap();

        let url = resolve_endpoint(&base, &["spiders", "../../projects/list"]).unwrap();
        assert_eq!(url.path(), "/api/v1/spiders/..%2F..%2Fprojects%2Flist");

        let url = resolve_endpoint(&base, &["spiders", "a?project=999"]).unwrap();
        assert_eq!(url.path(), "/api/v1/spiders/a%3Fproject=999");
        assert_eq!(url.query(), None);

        let url = resolve_endpoint(&base, &["spiders", "a#b"]).unwrap();
        assert_eq!(url.path(), "/api/v1/spiders/a%23b");
        assert_eq!(url.fragment(), None);

        let url = resolve_endpoint(&base, &["jobs", "%2e%2e"]).unwrap();
        assert_eq!(url.path(), "/api/v1/jobs/%252e%252e");
    }

    #[test]
    fn test_resolve_endpoint_rejects_dot_segments() {
        let base = base_url("https://api.example.com/api/v1").unwrap();
        for bad in ["..", ".", ""] {
            let err = resolve_endpoint(&base, &["jobs", bad]).unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(base_url("::nope").is_err());
    }
}

use std::collections::HashMap;

use crate::common::errors::{Error, Result};
use crate::common::helpers::validate_uuid;
use crate::config::DEFAULT_MAX_DEPTH;

/// Parse query parameters from a URI string.
///
/// Values are URL-decoded; a repeated key keeps its last value and a bare
/// flag maps to an empty string.
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let query = match uri.split_once('?') {
        Some((_, query)) => query,
        None => return params,
    };

    for param in query.split('&').filter(|p| !p.is_empty()) {
        match param.split_once('=') {
            Some((key, encoded)) => {
                let decoded = urlencoding::decode(encoded)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| encoded.to_string());
                params.insert(key.to_string(), decoded);
            }
            None => {
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

/// `max_depth` from the query, defaulting when absent. Zero is a valid depth.
pub fn get_max_depth(params: &HashMap<String, String>) -> Result<usize> {
    match params.get("max_depth") {
        None => Ok(DEFAULT_MAX_DEPTH),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| Error::BadRequest(format!("invalid max_depth: {}", raw))),
    }
}

/// Trailing UUID segment of `path` after `prefix`.
pub fn path_id<'a>(path: &'a str, prefix: &str) -> Result<&'a str> {
    let id = path
        .strip_prefix(prefix)
        .unwrap_or_default()
        .trim_end_matches('/');

    if id.is_empty() || !validate_uuid(id) {
        return Err(Error::BadRequest("valid id required".to_string()));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_values() {
        let params = parse_query_params("/timeline?max_depth=3&q=hello%20world&flag");
        assert_eq!(params.get("max_depth").map(String::as_str), Some("3"));
        assert_eq!(params.get("q").map(String::as_str), Some("hello world"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_max_depth_defaults_and_accepts_zero() {
        assert_eq!(get_max_depth(&parse_query_params("/timeline")).unwrap(), DEFAULT_MAX_DEPTH);
        assert_eq!(get_max_depth(&parse_query_params("/timeline?max_depth=0")).unwrap(), 0);
        assert!(matches!(
            get_max_depth(&parse_query_params("/timeline?max_depth=-1")),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn test_path_id_requires_uuid() {
        let id = uuid::Uuid::new_v4().to_string();
        let path = format!("/threads/{}", id);
        assert_eq!(path_id(&path, "/threads/").unwrap(), id);
        assert!(path_id("/threads/", "/threads/").is_err());
        assert!(path_id("/threads/abc", "/threads/").is_err());
    }
}

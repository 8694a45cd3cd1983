//! Query string arguments: a JSON document under the `args` key.
//!
//! `/api/fs/readfolder?args=%22docs%22` calls `fs_readfolder` with the JSON string `"docs"`.

use crate::args::Args;
use crate::error::ApiError;

pub const ARGS_KEY: &str = "args";

/// Decodes the query string of an API request.
///
/// No query, or an empty one, means the handler is called without argument. Failures are
/// handler failures and answer 404.
pub fn decode(query: Option<&str>) -> Result<Option<Args>, ApiError> {
    let Some(query) = query.filter(|query| !query.is_empty()) else {
        return Ok(None);
    };

    let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_err(ApiError::invalid_query)?;
    let value = pairs
        .into_iter()
        .find(|(key, value)| key == ARGS_KEY && !value.is_empty())
        .map(|(_, value)| value)
        .ok_or_else(|| ApiError::invalid_query(format!("missing `{ARGS_KEY}`")))?;

    let json = serde_json::from_str(&value).map_err(ApiError::invalid_query)?;
    Ok(Some(Args::Json(json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_query() {
        assert_eq!(decode(None).unwrap(), None);
        assert_eq!(decode(Some("")).unwrap(), None);
    }

    #[test]
    fn string_argument() {
        assert_eq!(decode(Some("args=%22a.txt%22")).unwrap(), Some(Args::Json(json!("a.txt"))));
    }

    #[test]
    fn nested_argument() {
        let query = "args=%7B%22title%22%3A%22Open+a+file%22%2C%22filetypes%22%3A%5B%5B%22Text%22%2C%22*.txt%22%5D%5D%2C%22n%22%3A%7B%22x%22%3A%5B1%2Cnull%5D%7D%7D";
        let expected = json!({"title": "Open a file", "filetypes": [["Text", "*.txt"]], "n": {"x": [1, null]}});

        assert_eq!(decode(Some(query)).unwrap(), Some(Args::Json(expected)));
    }

    #[test]
    fn other_keys_are_ignored() {
        assert_eq!(decode(Some("v=2&args=%5B1%2C2%5D")).unwrap(), Some(Args::Json(json!([1, 2]))));
    }

    #[test]
    fn missing_key_or_bad_json() {
        assert!(matches!(decode(Some("path=a.txt")), Err(ApiError::InvalidQuery { .. })));
        assert!(matches!(decode(Some("args=")), Err(ApiError::InvalidQuery { .. })));
        assert!(matches!(decode(Some("args=%7Bbroken")), Err(ApiError::InvalidQuery { .. })));
    }
}

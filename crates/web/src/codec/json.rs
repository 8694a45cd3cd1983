//! `application/json` bodies.

use bytes::Bytes;

use crate::args::Args;
use crate::error::DispatchError;

pub fn decode(body: &Bytes) -> Result<Args, DispatchError> {
    Ok(Args::Json(serde_json::from_slice(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_value() {
        let body = Bytes::from_static(br#"[{"src": "a", "dest": "b"}, {"src": "c", "dest": "d"}]"#);
        let args = decode(&body).unwrap();

        assert_eq!(args, Args::Json(json!([{"src": "a", "dest": "b"}, {"src": "c", "dest": "d"}])));
    }

    #[test]
    fn empty_or_broken_body() {
        assert!(matches!(decode(&Bytes::new()), Err(DispatchError::Json { .. })));
        assert!(matches!(decode(&Bytes::from_static(b"{\"path\":")), Err(DispatchError::Json { .. })));
    }
}

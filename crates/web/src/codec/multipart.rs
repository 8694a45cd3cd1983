//! A minimal `multipart/form-data` decoder.
//!
//! The boundary is not taken from the `Content-Type` header: the first line of the body,
//! including its CRLF, is the separator. The body is split on every occurrence of that
//! separator, the closing `--boundary--` line is cut off the last part, and each part is split
//! once on its first blank line into a header block and content.
//!
//! Only named fields are supported. Parts whose header block does not start with
//! `Content-Disposition: form-data;` are skipped, and `filename=` is not interpreted.

use std::collections::HashMap;
use std::ops::Range;

use bytes::Bytes;

use crate::error::MultipartError;

const CRLF: &[u8] = b"\r\n";
const BLANK_LINE: &[u8] = b"\r\n\r\n";
const FORM_DATA: &[u8] = b"Content-Disposition: form-data;";
const NAME_ATTR: &[u8] = b"name=\"";

/// Decodes the fields of a multipart body.
///
/// Field contents are slices of `body`, nothing is copied.
pub fn decode(body: &Bytes) -> Result<HashMap<String, Bytes>, MultipartError> {
    let separator_len = find(body, CRLF).ok_or(MultipartError::MissingBoundary)? + CRLF.len();
    let separator = &body[..separator_len];

    // the first segment is the empty preamble before the first separator
    let mut segments = split(body, separator).into_iter().skip(1).collect::<Vec<_>>();

    if let Some(last) = segments.last_mut() {
        // `--boundary--\r\n` is two bytes longer than the separator
        let end_marker_len = separator_len + 2;
        if last.len() < end_marker_len {
            return Err(MultipartError::Truncated { index: segments.len() - 1 });
        }
        last.end -= end_marker_len;
    }

    let mut fields = HashMap::with_capacity(segments.len());
    for (index, segment) in segments.into_iter().enumerate() {
        if segment.len() < CRLF.len() {
            return Err(MultipartError::Truncated { index });
        }
        let part = segment.start..segment.end - CRLF.len();

        let header_len = find(&body[part.clone()], BLANK_LINE).ok_or(MultipartError::MissingHeaderEnd { index })?;
        let header = &body[part.start..part.start + header_len];
        let content = part.start + header_len + BLANK_LINE.len()..part.end;

        if !header.starts_with(FORM_DATA) {
            continue;
        }

        let name = field_name(header, index)?;
        fields.insert(name, body.slice(content));
    }

    Ok(fields)
}

/// Extracts the quoted value of the first `name="..."` attribute.
fn field_name(header: &[u8], index: usize) -> Result<String, MultipartError> {
    let start = find(header, NAME_ATTR).ok_or(MultipartError::MissingName { index })? + NAME_ATTR.len();
    let len = header[start..].iter().position(|&b| b == b'"').ok_or(MultipartError::MissingName { index })?;

    String::from_utf8(header[start..start + len].to_vec()).map_err(|_utf8| MultipartError::InvalidName { index })
}

/// Splits `data` on every non-overlapping occurrence of `separator`.
fn split(data: &[u8], separator: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while let Some(pos) = find(&data[start..], separator) {
        ranges.push(start..start + pos);
        start += pos + separator.len();
    }
    ranges.push(start..data.len());

    ranges
}

fn find(data: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    data.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const BOUNDARY: &str = "----bridgeFormBoundary7MA4YWxkTrZu0gW";

    /// Encodes named fields the way browsers do for `FormData` without files.
    fn encode(fields: &[(&str, &[u8])]) -> Bytes {
        let mut body = Vec::new();
        for (name, content) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(body)
    }

    fn assert_decodes(fields: &[(&str, &[u8])]) {
        let decoded = decode(&encode(fields)).unwrap();

        assert_eq!(decoded.len(), fields.len());
        for (name, content) in fields {
            assert_eq!(decoded.get(*name).map(|b| &b[..]), Some(*content), "field {name}");
        }
    }

    #[test]
    fn single_field() {
        assert_decodes(&[("contents", b"hello")]);
    }

    #[test]
    fn two_fields() {
        assert_decodes(&[("path", b"notes/a.txt"), ("contents", b"line 1\r\nline 2\r\n")]);
    }

    #[test]
    fn five_fields() {
        assert_decodes(&[
            ("a", b""),
            ("b", b"\x00\x01\x02\xff"),
            ("c", b"{\"json\": [1, 2, 3]}"),
            ("d", "ünïcödé".as_bytes()),
            ("e", b"trailing\r\n"),
        ]);
    }

    #[test]
    fn contents_hello() {
        let body = Bytes::from(indoc! {"
            --XyZ\r
            Content-Disposition: form-data; name=\"contents\"\r
            \r
            hello\r
            --XyZ--\r
        "});

        let decoded = decode(&body).unwrap();
        assert_eq!(decoded, HashMap::from([("contents".to_string(), Bytes::from_static(b"hello"))]));
    }

    #[test]
    fn blank_line_inside_content() {
        assert_decodes(&[("contents", b"head\r\n\r\nbody\r\n\r\n"), ("path", b"x")]);
    }

    #[test]
    fn other_disposition_is_dropped() {
        let body = Bytes::from(format!(
            "--{BOUNDARY}\r\nContent-Disposition: attachment; name=\"skip\"\r\n\r\nignored\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"keep\"\r\n\r\nkept\r\n\
             --{BOUNDARY}--\r\n"
        ));

        let decoded = decode(&body).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("keep").map(|b| &b[..]), Some(&b"kept"[..]));
    }

    #[test]
    fn content_is_a_slice_of_the_body() {
        let body = encode(&[("contents", b"zero copy")]);
        let decoded = decode(&body).unwrap();

        let content = &decoded["contents"];
        let body_range = body.as_ptr() as usize..body.as_ptr() as usize + body.len();
        assert!(body_range.contains(&(content.as_ptr() as usize)));
    }

    #[test]
    fn malformed_bodies() {
        assert_eq!(decode(&Bytes::from_static(b"no line break")), Err(MultipartError::MissingBoundary));

        let body = Bytes::from_static(b"--b\r\nContent-Disposition: form-data; name=\"x\"\r\nno blank line\r\n--b--\r\n");
        assert_eq!(decode(&body), Err(MultipartError::MissingHeaderEnd { index: 0 }));

        let body = Bytes::from_static(b"--b\r\nContent-Disposition: form-data; filler\r\n\r\nvalue\r\n--b--\r\n");
        assert_eq!(decode(&body), Err(MultipartError::MissingName { index: 0 }));

        let body = Bytes::from_static(b"--b\r\n--b");
        assert!(matches!(decode(&body), Err(MultipartError::Truncated { .. })));
    }
}

//! JSON Pointer (RFC 6901) reference tokens

use serde::{Deserialize, Serialize};

/// A decoded JSON Pointer: an ordered list of reference tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPointer {
    pub tokens: Vec<String>,
}

impl JsonPointer {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

/// Reverse the `~0`/`~1` escapes of a single reference token. Returns `None`
/// for a `~` not followed by `0` or `1`.
pub fn decode_token(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_token("b~1c").as_deref(), Some("b/c"));
        assert_eq!(decode_token("x~0y").as_deref(), Some("x~y"));
        // ~01 is "~1" literally, not "/"
        assert_eq!(decode_token("~01").as_deref(), Some("~1"));
        assert_eq!(decode_token("bad~2"), None);
        assert_eq!(decode_token("trailing~"), None);
    }
}

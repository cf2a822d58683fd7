//! Opaque pagination cursors (C7, spec.md §4.6).
//!
//! A cursor is an opaque string to callers but is, underneath, a
//! base64-encoded non-negative integer offset. Encoding is
//! deterministic: the same offset always encodes to the same string,
//! so cursors are safe to compare for equality without decoding them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::Error;

/// Encode an offset as an opaque cursor string.
///
/// `encode(n)` always returns the same string for the same `n`.
pub fn encode_cursor(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(offset.to_string())
}

/// Decode a cursor string back into a non-negative offset.
///
/// Returns [`Error::InvalidParams`] for anything that isn't a
/// validly-encoded non-negative integer, per spec.md §4.6 — a malformed
/// cursor is a client error, not a server fault.
pub fn decode_cursor(cursor: &str) -> crate::error::Result<usize> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| Error::invalid_params("malformed pagination cursor"))?;
    let text = String::from_utf8(bytes).map_err(|_| Error::invalid_params("malformed pagination cursor"))?;
    text.parse::<usize>()
        .map_err(|_| Error::invalid_params("malformed pagination cursor"))
}

/// Slice `items` into a page starting at the offset `cursor` decodes
/// to (or `0` if `cursor` is `None`), returning at most `page_size`
/// items and the cursor for the next page, if any remain.
pub fn paginate<T: Clone>(
    items: &[T],
    cursor: Option<&str>,
    page_size: usize,
) -> crate::error::Result<(Vec<T>, Option<String>)> {
    let offset = match cursor {
        Some(c) => decode_cursor(c)?,
        None => 0,
    };
    if offset > items.len() {
        return Ok((Vec::new(), None));
    }
    let end = (offset + page_size).min(items.len());
    let page = items[offset..end].to_vec();
    let next = if end < items.len() {
        Some(encode_cursor(end))
    } else {
        None
    };
    Ok((page, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode_cursor(42), encode_cursor(42));
        assert_ne!(encode_cursor(42), encode_cursor(43));
    }

    #[test]
    fn round_trips_through_encode_decode() {
        for n in [0usize, 1, 17, 1000, usize::MAX / 2] {
            let cursor = encode_cursor(n);
            assert_eq!(decode_cursor(&cursor).unwrap(), n);
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_cursor("not-a-real-cursor!!").unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn decode_rejects_negative_looking_text() {
        let fake = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("-5");
        let err = decode_cursor(&fake).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn paginate_splits_into_pages_and_emits_next_cursor() {
        let items: Vec<i32> = (0..10).collect();
        let (page1, next1) = paginate(&items, None, 4).unwrap();
        assert_eq!(page1, vec![0, 1, 2, 3]);
        let next1 = next1.unwrap();

        let (page2, next2) = paginate(&items, Some(&next1), 4).unwrap();
        assert_eq!(page2, vec![4, 5, 6, 7]);
        let next2 = next2.unwrap();

        let (page3, next3) = paginate(&items, Some(&next2), 4).unwrap();
        assert_eq!(page3, vec![8, 9]);
        assert!(next3.is_none());
    }

    #[test]
    fn paginate_past_end_yields_empty_page() {
        let items = vec![1, 2, 3];
        let cursor = encode_cursor(100);
        let (page, next) = paginate(&items, Some(&cursor), 10).unwrap();
        assert!(page.is_empty());
        assert!(next.is_none());
    }

    proptest::proptest! {
        #[test]
        fn cursor_round_trips_for_any_offset(offset in 0usize..10_000_000) {
            let cursor = encode_cursor(offset);
            proptest::prop_assert_eq!(decode_cursor(&cursor).unwrap(), offset);
        }

        #[test]
        fn paginate_never_exceeds_page_size(len in 0usize..200, page_size in 1usize..50) {
            let items: Vec<usize> = (0..len).collect();
            let (page, _) = paginate(&items, None, page_size).unwrap();
            proptest::prop_assert!(page.len() <= page_size);
        }
    }
}

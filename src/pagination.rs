//! Cursor-following collection of paginated listings.
//!
//! Slack paginates every listing endpoint with opaque cursors. This module
//! drives an abstract "fetch one page" operation until the source reports no
//! further cursor, concatenating the pages into one collection in arrival
//! order. There is no deduplication - the source is trusted not to repeat
//! items across pages - and no retry: any page failure aborts the traversal.

use tracing::debug;

use crate::api::Page;

/// Fetch every page of a listing and return the concatenated items.
///
/// `fetch` is called first with no cursor, then with each `next_cursor` the
/// previous page returned. An absent or empty cursor terminates, so a source
/// returning `Some("")` behaves exactly like one returning `None`.
pub fn collect_all<T, E, F>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, E>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.as_deref())?;
        debug!(page_len = page.items.len(), total = items.len(), "collected page");
        items.extend(page.items);

        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: &[u32], next: Option<&str>) -> Page<u32> {
        Page {
            items: items.to_vec(),
            next_cursor: next.map(str::to_string),
        }
    }

    #[test]
    fn single_page_without_cursor_terminates() {
        let result: Result<Vec<u32>, ()> = collect_all(|cursor| {
            assert_eq!(cursor, None);
            Ok(page(&[1, 2, 3], None))
        });
        assert_eq!(result.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn concatenates_pages_in_page_order() {
        let mut calls = 0;
        let result: Result<Vec<u32>, ()> = collect_all(|cursor| {
            calls += 1;
            match cursor {
                None => Ok(page(&[1, 2], Some("c1"))),
                Some("c1") => Ok(page(&[3], Some("c2"))),
                Some("c2") => Ok(page(&[4, 5], None)),
                other => panic!("unexpected cursor {other:?}"),
            }
        });
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(calls, 3, "exactly one fetch per page");
    }

    #[test]
    fn empty_string_cursor_terminates_like_none() {
        let mut calls = 0;
        let result: Result<Vec<u32>, ()> = collect_all(|_| {
            calls += 1;
            Ok(page(&[7], Some("")))
        });
        assert_eq!(result.unwrap(), vec![7]);
        assert_eq!(calls, 1);
    }

    #[test]
    fn empty_pages_are_allowed() {
        let result: Result<Vec<u32>, ()> = collect_all(|cursor| match cursor {
            None => Ok(page(&[], Some("c1"))),
            Some("c1") => Ok(page(&[9], None)),
            other => panic!("unexpected cursor {other:?}"),
        });
        assert_eq!(result.unwrap(), vec![9]);
    }

    #[test]
    fn does_not_deduplicate_repeated_items() {
        let result: Result<Vec<u32>, ()> = collect_all(|cursor| match cursor {
            None => Ok(page(&[1, 1], Some("c1"))),
            _ => Ok(page(&[1], None)),
        });
        assert_eq!(result.unwrap(), vec![1, 1, 1]);
    }

    #[test]
    fn fetch_error_aborts_and_propagates() {
        let mut calls = 0;
        let result: Result<Vec<u32>, &str> = collect_all(|cursor| {
            calls += 1;
            match cursor {
                None => Ok(page(&[1], Some("c1"))),
                _ => Err("boom"),
            }
        });
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls, 2, "no retry after a failed page");
    }
}

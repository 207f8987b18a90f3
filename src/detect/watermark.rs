use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static PAGE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:Page:?)?\s*\d+\s*$").unwrap());

/// A short string that makes up the whole (or near-whole) content of a set
/// of pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatermarkCandidate {
    pub text: String,
    /// The page the text was taken from, then the validated pages after it,
    /// in (length, text, index) order.
    pub page_indices: Vec<usize>,
}

/// True when `text` is nothing but an optional `Page`/`Page:` label and a
/// number, ignoring surrounding whitespace.
pub fn is_page_number(text: &str) -> bool {
    PAGE_NUMBER_RE.is_match(text)
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Page indices ordered by `(character length, text, index)`.
///
/// The index component fixes the order of identical pages.
pub fn order_by_length<S: AsRef<str>>(page_texts: &[S]) -> Vec<usize> {
    let mut keyed = page_texts
        .iter()
        .enumerate()
        .map(|(index, text)| (char_len(text.as_ref()), text.as_ref(), index))
        .collect::<Vec<(usize, &str, usize)>>();
    keyed.sort();
    keyed.into_iter().map(|(_, _, index)| index).collect()
}

/// Search for a watermark of `min_len..max_len` characters.
///
/// Candidates are tried shortest first. A page qualifies when its text is a
/// substring of every page that sorts after it; the first qualifying page
/// ends the search and the pages after it are handed to
/// [`refine_watermark_pages`].
///
/// The source page is itself a watermark page: `page_indices` starts with it,
/// followed by the pages the refinement keeps, so `["Scanned", "Scanned",
/// "Scanned\nreal stuff here"]` yields `[0, 1]`. Returns `None` when nothing
/// qualifies or the refinement keeps no page, since a single page is not a
/// recurring stamp.
pub fn find_watermark_pages<S: AsRef<str>>(
    page_texts: &[S],
    min_len: usize,
    max_len: usize,
) -> Option<WatermarkCandidate> {
    let order = order_by_length(page_texts);
    if order.len() < 2 {
        return None;
    }

    for (position, &index) in order[..order.len() - 1].iter().enumerate() {
        let text = page_texts[index].as_ref();
        let length = char_len(text);
        if length < min_len {
            continue;
        }
        if length >= max_len {
            break;
        }

        let later = &order[position + 1..];
        let contained = later
            .iter()
            .all(|&other| page_texts[other].as_ref().contains(text));
        if !contained {
            continue;
        }

        let confirmed = refine_watermark_pages(page_texts, later, text);
        debug!(
            source_page = index,
            length,
            checked = later.len(),
            accepted = confirmed.len(),
            "watermark hypothesis held"
        );
        if confirmed.is_empty() {
            return None;
        }

        let mut page_indices = Vec::with_capacity(confirmed.len() + 1);
        page_indices.push(index);
        page_indices.extend(confirmed);

        return Some(WatermarkCandidate {
            text: text.to_string(),
            page_indices,
        });
    }

    None
}

/// Keep the leading run of `indices` whose pages are `text` alone or `text`
/// flanked only by page-number material.
///
/// Validation stops at the first page that fails; pages after it are not
/// examined, so the result is always a prefix of `indices`.
///
/// # Panics
///
/// Panics when a page that differs from `text` does not contain it. Callers
/// must only pass pages that passed the containment check.
pub fn refine_watermark_pages<S: AsRef<str>>(
    page_texts: &[S],
    indices: &[usize],
    text: &str,
) -> Vec<usize> {
    let mut accepted = Vec::with_capacity(indices.len());

    for &index in indices {
        let full = page_texts[index].as_ref();
        if full != text {
            let Some(position) = full.find(text) else {
                panic!(
                    "page {index} does not contain watermark candidate {text:?}; containment must be checked first"
                );
            };

            let before = &full[..position];
            if !before.is_empty() && !is_page_number(before) {
                break;
            }
            let after = &full[position + text.len()..];
            if !after.is_empty() && !is_page_number(after) {
                break;
            }
        }
        accepted.push(index);
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_pattern_accepts_labels_and_digits() {
        assert!(is_page_number("12"));
        assert!(is_page_number("  7\n"));
        assert!(is_page_number("Page 3"));
        assert!(is_page_number("Page: 41 "));
        assert!(is_page_number("\nPage:9"));
    }

    #[test]
    fn page_number_pattern_rejects_other_text() {
        assert!(!is_page_number(""));
        assert!(!is_page_number("Page"));
        assert!(!is_page_number("page 3"));
        assert!(!is_page_number(" extra notes here"));
        assert!(!is_page_number("3 of 10"));
        assert!(!is_page_number("Index\nSymbols\n64-bit Python\ninstalling\n10"));
    }

    #[test]
    fn order_breaks_ties_by_text_then_index() {
        let pages = ["bbb", "aaa", "cc", "aaa", "dddd"];
        assert_eq!(order_by_length(&pages), vec![2, 1, 3, 0, 4]);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let pages = ["ééé", "abcd"];
        assert_eq!(order_by_length(&pages), vec![0, 1]);
    }
}

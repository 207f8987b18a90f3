/// Indices of pages with no extracted text at all.
///
/// Whitespace is content here; upstream normalization is expected to turn
/// whitespace-only pages into empty strings.
pub fn find_empty_pages<S: AsRef<str>>(page_texts: &[S]) -> Vec<usize> {
    page_texts
        .iter()
        .enumerate()
        .filter_map(|(index, text)| {
            if text.as_ref().is_empty() {
                Some(index)
            } else {
                None
            }
        })
        .collect()
}

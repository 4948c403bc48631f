//! Offset paginator for list pages. Page size is fixed at 25; bad page
//! numbers never error: non-numeric or below 1 falls back to page 1,
//! beyond the last page falls back to the last page.

/// Records per list page.
pub const PAGE_SIZE: usize = 25;

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    /// `?page=N` link to the previous page, if any.
    pub fn previous_page_url(&self) -> Option<String> {
        self.has_previous().then(|| format!("?page={}", self.number - 1))
    }

    /// `?page=N` link to the next page, if any.
    pub fn next_page_url(&self) -> Option<String> {
        self.has_next().then(|| format!("?page={}", self.number + 1))
    }
}

/// Slice `items` into the requested page. `requested` is the raw `page`
/// query value, if present.
pub fn paginate<T>(items: Vec<T>, per_page: usize, requested: Option<&str>) -> Page<T> {
    let num_pages = (items.len().max(1) + per_page - 1) / per_page;
    let number = requested
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
        .min(num_pages);

    let items = items.into_iter().skip((number - 1) * per_page).take(per_page).collect();
    Page { items, number, num_pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thirty() -> Vec<u32> {
        (1..=30).collect()
    }

    #[test]
    fn first_page_holds_page_size_items_and_links_forward() {
        let page = paginate(thirty(), PAGE_SIZE, Some("1"));
        assert_eq!(page.items.len(), 25);
        assert_eq!(page.items[0], 1);
        assert!(!page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.next_page_url().as_deref(), Some("?page=2"));
        assert_eq!(page.previous_page_url(), None);
    }

    #[test]
    fn last_page_holds_the_remainder_and_links_back() {
        let page = paginate(thirty(), PAGE_SIZE, Some("2"));
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0], 26);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.previous_page_url().as_deref(), Some("?page=1"));
        assert_eq!(page.next_page_url(), None);
    }

    #[test]
    fn non_numeric_page_falls_back_to_page_one() {
        let page = paginate(thirty(), PAGE_SIZE, Some("abc"));
        assert_eq!(page.number, 1);
        assert_eq!(page.items.len(), 25);

        let page = paginate(thirty(), PAGE_SIZE, Some("-3"));
        assert_eq!(page.number, 1);

        let page = paginate(thirty(), PAGE_SIZE, Some("0"));
        assert_eq!(page.number, 1);

        let page = paginate(thirty(), PAGE_SIZE, None);
        assert_eq!(page.number, 1);
    }

    #[test]
    fn out_of_range_page_falls_back_to_last_page() {
        let page = paginate(thirty(), PAGE_SIZE, Some("99"));
        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn empty_collection_is_a_single_empty_page() {
        let page = paginate(Vec::<u32>::new(), PAGE_SIZE, None);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_other_pages());
    }

    #[test]
    fn exact_multiple_has_no_dangling_page() {
        let page = paginate((1..=50).collect::<Vec<u32>>(), PAGE_SIZE, Some("2"));
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.items.len(), 25);
        assert!(!page.has_next());
    }
}

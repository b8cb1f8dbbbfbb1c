//! Pagination metadata and the page-link window shown under search results.

use serde::Serialize;

use crate::models::Pagination;

impl Pagination {
    /// Envelope for a result set that is returned in one piece.
    pub fn single_page(count: usize) -> Self {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        Self {
            page: 1,
            page_size: count,
            total: count,
            total_pages: 1,
        }
    }

    pub fn new(page: u32, page_size: u32, total: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size).max(1);
        Self {
            page: page.clamp(1, total_pages),
            page_size,
            total,
            total_pages,
        }
    }
}

/// One entry of the pagination bar.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Previous { page: u32, disabled: bool },
    Page { page: u32, active: bool },
    Ellipsis,
    Next { page: u32, disabled: bool },
}

/// Build the pagination bar for `current` out of `total_pages`.
///
/// Layout: previous, first page, an ellipsis when the window does not touch
/// the first page, the pages adjacent to `current`, another ellipsis, the
/// last page, next. `current` is clamped into range and a total of zero is
/// treated as a single page, so every emitted page lies in `[1, total_pages]`.
pub fn page_links(current: u32, total_pages: u32) -> Vec<PageLink> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);

    let mut links = Vec::with_capacity(9);
    links.push(PageLink::Previous {
        page: current.saturating_sub(1).max(1),
        disabled: current == 1,
    });
    links.push(PageLink::Page {
        page: 1,
        active: current == 1,
    });

    if current > 3 {
        links.push(PageLink::Ellipsis);
    }

    let window_start = current.saturating_sub(1).max(2);
    let window_end = current.saturating_add(1).min(total.saturating_sub(1));
    for page in window_start..=window_end {
        links.push(PageLink::Page {
            page,
            active: page == current,
        });
    }

    if current.saturating_add(2) < total {
        links.push(PageLink::Ellipsis);
    }

    if total > 1 {
        links.push(PageLink::Page {
            page: total,
            active: current == total,
        });
    }

    links.push(PageLink::Next {
        page: current.saturating_add(1).min(total),
        disabled: current == total,
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(links: &[PageLink]) -> Vec<u32> {
        links
            .iter()
            .filter_map(|l| match l {
                PageLink::Page { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    fn ellipses(links: &[PageLink]) -> usize {
        links.iter().filter(|l| **l == PageLink::Ellipsis).count()
    }

    #[test]
    fn test_single_page_envelope() {
        let p = Pagination::single_page(7);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 7);
        assert_eq!(p.total, 7);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn test_single_page_envelope_empty() {
        let p = Pagination::single_page(0);
        assert_eq!(p.total, 0);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn test_new_computes_total_pages() {
        assert_eq!(Pagination::new(1, 20, 41).total_pages, 3);
        assert_eq!(Pagination::new(1, 20, 40).total_pages, 2);
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 1);
        assert_eq!(Pagination::new(9, 20, 41).page, 3);
        assert_eq!(Pagination::new(1, 0, 5).page_size, 1);
    }

    #[test]
    fn test_links_single_page() {
        let links = page_links(1, 1);
        assert_eq!(pages(&links), vec![1]);
        assert_eq!(ellipses(&links), 0);
        assert_eq!(links[0], PageLink::Previous { page: 1, disabled: true });
        assert_eq!(*links.last().unwrap(), PageLink::Next { page: 1, disabled: true });
    }

    #[test]
    fn test_links_first_page_of_many() {
        let links = page_links(1, 10);
        assert_eq!(pages(&links), vec![1, 2, 10]);
        assert_eq!(ellipses(&links), 1);
        assert_eq!(*links.last().unwrap(), PageLink::Next { page: 2, disabled: false });
    }

    #[test]
    fn test_links_middle_page() {
        let links = page_links(5, 10);
        assert_eq!(pages(&links), vec![1, 4, 5, 6, 10]);
        assert_eq!(ellipses(&links), 2);
        assert!(links.contains(&PageLink::Page { page: 5, active: true }));
    }

    #[test]
    fn test_links_last_page() {
        let links = page_links(10, 10);
        assert_eq!(pages(&links), vec![1, 9, 10]);
        assert_eq!(ellipses(&links), 1);
        assert_eq!(*links.last().unwrap(), PageLink::Next { page: 10, disabled: true });
    }

    #[test]
    fn test_links_no_ellipsis_near_edges() {
        assert_eq!(pages(&page_links(3, 5)), vec![1, 2, 3, 4, 5]);
        assert_eq!(ellipses(&page_links(3, 5)), 0);
    }

    #[test]
    fn test_links_clamp_out_of_range_current() {
        assert_eq!(pages(&page_links(0, 4)), vec![1, 2, 4]);
        assert_eq!(pages(&page_links(99, 4)), vec![1, 3, 4]);
        assert_eq!(pages(&page_links(3, 0)), vec![1]);
    }

    #[test]
    fn test_links_never_leave_range() {
        for total in 0..12u32 {
            for current in 0..15u32 {
                let upper = total.max(1);
                for link in page_links(current, total) {
                    let page = match link {
                        PageLink::Previous { page, .. }
                        | PageLink::Page { page, .. }
                        | PageLink::Next { page, .. } => page,
                        PageLink::Ellipsis => continue,
                    };
                    assert!(
                        (1..=upper).contains(&page),
                        "page {page} out of range for current={current} total={total}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_links_at_u32_limit() {
        let max = u32::MAX;
        let cases = [(max, max), (max - 1, max), (max - 2, max), (1, max), (max, max - 1)];
        for (current, total) in cases {
            let links = page_links(current, total);
            for link in &links {
                if let PageLink::Previous { page, .. }
                | PageLink::Page { page, .. }
                | PageLink::Next { page, .. } = *link
                {
                    assert!(
                        (1..=total).contains(&page),
                        "page {page} out of range for current={current} total={total}"
                    );
                }
            }
        }

        let links = page_links(max, max);
        assert_eq!(pages(&links), vec![1, max - 1, max]);
        assert_eq!(*links.last().unwrap(), PageLink::Next { page: max, disabled: true });

        let links = page_links(max - 1, max);
        assert_eq!(pages(&links), vec![1, max - 2, max - 1, max]);
        assert_eq!(ellipses(&links), 1);
        assert_eq!(*links.last().unwrap(), PageLink::Next { page: max, disabled: false });
    }
}

// src/crawl/state.rs
// =============================================================================
// The crawl's bookkeeping, in one object:
//
// - frontier: pages waiting to be fetched, in FIFO (breadth-first) order
// - pending:  the same pages as a set, for O(1) "already queued?" checks
// - visited:  pages already fetched (or attempted), never fetched again
// - checked:  images already dispatched for checking, never checked again
//
// Invariants:
// - a page is in at most one of {pending, visited}
// - frontier and pending always hold the same pages
//
// Every "have we seen this?" question is answered by a method that checks
// AND marks in one step. With &mut self nobody can sneak in between; if the
// crawl ever goes multi-worker, wrapping this struct in a Mutex keeps that
// guarantee without touching the callers' logic.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug, Default)]
pub struct CrawlState {
    frontier: VecDeque<Url>,
    pending: HashSet<Url>,
    visited: HashSet<Url>,
    checked: HashSet<Url>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    // Queues a page unless it was already visited or is already queued
    //
    // Returns true if the page was added.
    pub fn enqueue(&mut self, page: Url) -> bool {
        if self.visited.contains(&page) || self.pending.contains(&page) {
            return false;
        }
        self.pending.insert(page.clone());
        self.frontier.push_back(page);
        true
    }

    // Takes the next page off the frontier and marks it visited
    //
    // Marking happens here, before the page is fetched, so a page that fails
    // to load is never tried again.
    pub fn next_page(&mut self) -> Option<Url> {
        while let Some(page) = self.frontier.pop_front() {
            self.pending.remove(&page);
            if self.visited.insert(page.clone()) {
                return Some(page);
            }
        }
        None
    }

    // Marks an image as checked; true means "you are the first, go check it"
    pub fn mark_checked(&mut self, image: &Url) -> bool {
        !self.checked.contains(image) && self.checked.insert(image.clone())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    pub fn pending_count(&self) -> usize {
        self.frontier.len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why both a VecDeque and a HashSet for the frontier?
//    - The VecDeque keeps the order (breadth-first needs FIFO)
//    - The HashSet answers "is it already queued?" in O(1)
//    - Scanning the VecDeque instead would be O(n) per link
//
// 2. Why does HashSet::insert return a bool?
//    - true = the value was new, false = it was already there
//    - That makes "check and mark" a single call
//
// 3. Why Url instead of String?
//    - Url is already normalized by the url crate (lowercase host, default
//      port removed), so two spellings of the same address compare equal
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut state = CrawlState::new();
        state.enqueue(url("/a"));
        state.enqueue(url("/b"));
        state.enqueue(url("/c"));

        assert_eq!(state.next_page(), Some(url("/a")));
        assert_eq!(state.next_page(), Some(url("/b")));
        assert_eq!(state.next_page(), Some(url("/c")));
        assert_eq!(state.next_page(), None);
    }

    #[test]
    fn test_pending_page_is_not_queued_twice() {
        let mut state = CrawlState::new();
        assert!(state.enqueue(url("/a")));
        assert!(!state.enqueue(url("/a")));
        assert_eq!(state.pending_count(), 1);
    }

    #[test]
    fn test_visited_page_is_not_queued_again() {
        let mut state = CrawlState::new();
        state.enqueue(url("/a"));
        assert_eq!(state.next_page(), Some(url("/a")));

        assert!(!state.enqueue(url("/a")));
        assert_eq!(state.next_page(), None);
        assert_eq!(state.visited_count(), 1);
    }

    #[test]
    fn test_image_checked_once() {
        let mut state = CrawlState::new();
        let image = url("/logo.png");

        assert!(state.mark_checked(&image));
        assert!(!state.mark_checked(&image));
        assert_eq!(state.checked_count(), 1);
    }

    #[test]
    fn test_pages_and_images_are_separate_namespaces() {
        let mut state = CrawlState::new();
        let shared = url("/thing");

        assert!(state.mark_checked(&shared));
        assert!(state.enqueue(shared.clone()));
        assert_eq!(state.next_page(), Some(shared));
    }
}

//! Generic paged selection.
//!
//! Lets a user page through a large item collection and pick one, without
//! knowing anything about the prompt UI or the backing API. Navigation
//! pseudo-choices ("Previous Page" / "Next Page") are only offered when the
//! corresponding page exists.

use anyhow::{bail, Result};
use thiserror::Error;

/// One page of a larger collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total item count across all pages.
    pub total: u64,
}

/// Fetches pages by offset and limit.
#[allow(async_fn_in_trait)]
pub trait PageFetcher<T> {
    async fn fetch(&mut self, offset: u64, limit: u64) -> Result<Page<T>>;
}

/// What the user picked on one presentation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Index into the presented labels.
    Item(usize),
    NextPage,
    PrevPage,
}

/// Which navigation pseudo-choices are available on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavOptions {
    pub has_prev: bool,
    pub has_next: bool,
}

/// Single-choice prompt abstraction, so selection logic stays testable
/// without a terminal.
pub trait Prompter {
    /// Present the labels (plus any offered navigation choices) and return
    /// what the user picked.
    fn choose(&mut self, message: &str, labels: &[String], nav: NavOptions) -> Result<Choice>;
}

/// Structurally invalid selection parameters.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("page limit must be positive")]
    InvalidLimit,
}

/// Page through a collection and let the user pick one item.
///
/// Returns `Ok(None)` when the collection is empty; the offset is clamped
/// to page boundaries and never exceeds the last valid page.
///
/// # Example
///
/// ```
/// use stateless_cli::select::{select_paged, Choice, NavOptions, Page, PageFetcher, Prompter};
///
/// struct Names(Vec<String>);
///
/// impl PageFetcher<String> for Names {
///     async fn fetch(&mut self, offset: u64, limit: u64) -> anyhow::Result<Page<String>> {
///         let start = (offset as usize).min(self.0.len());
///         let end = (start + limit as usize).min(self.0.len());
///         Ok(Page { items: self.0[start..end].to_vec(), total: self.0.len() as u64 })
///     }
/// }
///
/// struct First;
///
/// impl Prompter for First {
///     fn choose(&mut self, _: &str, _: &[String], _: NavOptions) -> anyhow::Result<Choice> {
///         Ok(Choice::Item(0))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let mut fetcher = Names(vec!["alpha".into(), "beta".into()]);
/// let picked = select_paged(&mut fetcher, 10, |s: &String| s.clone(), &mut First, "pick")
///     .await
///     .unwrap();
/// assert_eq!(picked.as_deref(), Some("alpha"));
/// # });
/// ```
pub async fn select_paged<T, F, R, P>(
    fetcher: &mut F,
    limit: u64,
    render_label: R,
    prompter: &mut P,
    message: &str,
) -> Result<Option<T>>
where
    F: PageFetcher<T>,
    R: Fn(&T) -> String,
    P: Prompter + ?Sized,
{
    if limit == 0 {
        bail!(SelectError::InvalidLimit);
    }

    let mut offset = 0u64;
    loop {
        let page = fetcher.fetch(offset, limit).await?;

        if page.items.is_empty() {
            if offset == 0 {
                return Ok(None);
            }
            // The collection shrank under us; step back a page.
            offset = offset.saturating_sub(limit);
            continue;
        }

        let nav = NavOptions {
            has_prev: offset > 0,
            has_next: offset + limit < page.total,
        };
        let labels: Vec<String> = page.items.iter().map(&render_label).collect();

        match prompter.choose(message, &labels, nav)? {
            Choice::Item(index) => {
                if let Some(item) = page.items.into_iter().nth(index) {
                    return Ok(Some(item));
                }
                // Out-of-range index from the prompter; present again.
            }
            Choice::NextPage if nav.has_next => offset += limit,
            Choice::PrevPage if nav.has_prev => offset = offset.saturating_sub(limit),
            // Navigation that was not offered is ignored.
            Choice::NextPage | Choice::PrevPage => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fetcher over an in-memory collection, recording requested offsets.
    struct VecFetcher {
        items: Vec<String>,
        offsets_seen: Vec<u64>,
    }

    impl VecFetcher {
        fn new(count: usize) -> Self {
            Self {
                items: (0..count).map(|i| format!("item-{i}")).collect(),
                offsets_seen: Vec::new(),
            }
        }
    }

    impl PageFetcher<String> for VecFetcher {
        async fn fetch(&mut self, offset: u64, limit: u64) -> Result<Page<String>> {
            self.offsets_seen.push(offset);
            let start = (offset as usize).min(self.items.len());
            let end = (start + limit as usize).min(self.items.len());
            Ok(Page {
                items: self.items[start..end].to_vec(),
                total: self.items.len() as u64,
            })
        }
    }

    /// Prompter that replays scripted choices, asserting the navigation
    /// options offered on each step.
    struct ScriptedPrompter {
        script: Vec<(NavOptions, Choice)>,
        step: usize,
    }

    impl ScriptedPrompter {
        fn new(script: Vec<(NavOptions, Choice)>) -> Self {
            Self { script, step: 0 }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn choose(&mut self, _message: &str, labels: &[String], nav: NavOptions) -> Result<Choice> {
            assert!(!labels.is_empty());
            let (expected_nav, choice) = self.script[self.step];
            assert_eq!(nav, expected_nav, "step {}", self.step);
            self.step += 1;
            Ok(choice)
        }
    }

    fn nav(has_prev: bool, has_next: bool) -> NavOptions {
        NavOptions { has_prev, has_next }
    }

    #[tokio::test]
    async fn test_pagination_navigation() {
        // 25 items, limit 10: page 1 offers Next only, page 2 both,
        // page 3 Previous only.
        let mut fetcher = VecFetcher::new(25);
        let mut prompter = ScriptedPrompter::new(vec![
            (nav(false, true), Choice::NextPage),
            (nav(true, true), Choice::NextPage),
            (nav(true, false), Choice::PrevPage),
            (nav(true, true), Choice::Item(3)),
        ]);

        let picked = select_paged(&mut fetcher, 10, |s| s.clone(), &mut prompter, "pick")
            .await
            .unwrap();

        assert_eq!(picked.as_deref(), Some("item-13"));
        assert_eq!(fetcher.offsets_seen, vec![0, 10, 20, 10]);
    }

    #[tokio::test]
    async fn test_select_on_first_page() {
        let mut fetcher = VecFetcher::new(5);
        let mut prompter = ScriptedPrompter::new(vec![(nav(false, false), Choice::Item(2))]);

        let picked = select_paged(&mut fetcher, 10, |s| s.clone(), &mut prompter, "pick")
            .await
            .unwrap();
        assert_eq!(picked.as_deref(), Some("item-2"));
    }

    #[tokio::test]
    async fn test_empty_collection_returns_none() {
        let mut fetcher = VecFetcher::new(0);
        let mut prompter = ScriptedPrompter::new(vec![]);

        let picked = select_paged(&mut fetcher, 10, |s| s.clone(), &mut prompter, "pick")
            .await
            .unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_exact_page_boundary_offers_no_next() {
        // 20 items, limit 10: page 2 must not offer Next.
        let mut fetcher = VecFetcher::new(20);
        let mut prompter = ScriptedPrompter::new(vec![
            (nav(false, true), Choice::NextPage),
            (nav(true, false), Choice::Item(0)),
        ]);

        let picked = select_paged(&mut fetcher, 10, |s| s.clone(), &mut prompter, "pick")
            .await
            .unwrap();
        assert_eq!(picked.as_deref(), Some("item-10"));
    }

    #[tokio::test]
    async fn test_unoffered_navigation_is_ignored() {
        let mut fetcher = VecFetcher::new(5);
        let mut prompter = ScriptedPrompter::new(vec![
            (nav(false, false), Choice::PrevPage),
            (nav(false, false), Choice::Item(0)),
        ]);

        let picked = select_paged(&mut fetcher, 10, |s| s.clone(), &mut prompter, "pick")
            .await
            .unwrap();
        assert_eq!(picked.as_deref(), Some("item-0"));
    }

    #[tokio::test]
    async fn test_zero_limit_is_invalid() {
        let mut fetcher = VecFetcher::new(5);
        let mut prompter = ScriptedPrompter::new(vec![]);

        let err = select_paged(&mut fetcher, 0, |s| s.clone(), &mut prompter, "pick")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }
}

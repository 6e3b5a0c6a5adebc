//! Blog post title filter.

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::viewport::{NodeId, ViewPort};

/// Whether a post titled `title` survives `query`.
///
/// Case-insensitive substring match on the trimmed query; an empty query
/// matches everything.
#[must_use]
pub fn matches(title: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || title.to_lowercase().contains(&query)
}

#[derive(Clone, Debug)]
struct Card {
    node: NodeId,
    title: String,
}

#[derive(Clone, Debug)]
pub struct PostSearch {
    input: NodeId,
    cards: Vec<Card>,
    no_results: Option<NodeId>,
}

impl PostSearch {
    /// Index the post cards and their titles.
    ///
    /// # Errors
    ///
    /// [`SiteError::MissingElement`] when the page has no search input.
    pub fn init(vp: &impl ViewPort, config: &SiteConfig) -> Result<Self> {
        let selectors = &config.selectors;
        let input = vp
            .select(&selectors.search_input)
            .ok_or_else(|| SiteError::missing("search", &selectors.search_input))?;
        let cards = vp
            .select_all(&selectors.post_cards)
            .into_iter()
            .map(|node| {
                let title = vp
                    .select_within(&node, &selectors.post_title)
                    .map(|t| vp.text(&t))
                    .unwrap_or_default();
                Card { node, title }
            })
            .collect::<Vec<_>>();
        log::info!("search: indexed {} posts", cards.len());
        Ok(Self { input, cards, no_results: vp.select(&selectors.no_results) })
    }

    #[must_use]
    pub fn is_input(&self, target: &NodeId) -> bool {
        &self.input == target
    }

    /// Re-filter from the input's current value. Returns the visible count.
    pub fn on_input(&self, vp: &mut impl ViewPort) -> usize {
        let query = vp.value(&self.input);
        let mut visible = 0;
        for card in &self.cards {
            let show = matches(&card.title, &query);
            vp.set_style(&card.node, "display", if show { "" } else { "none" });
            visible += usize::from(show);
        }
        if let Some(no_results) = &self.no_results {
            vp.set_style(no_results, "display", if visible == 0 { "block" } else { "none" });
        }
        visible
    }
}

//! Finds and triggers a playback action at the cursor's current level.

use std::sync::Arc;

use crate::controller::{BrowseItem, BrowseResult, BrowseService, ControllerResult};
use crate::protocol_constants::{DEFAULT_ACTION_PRIORITY, PLAY_NOW};

use super::BrowseSession;

/// Outcome of [`ActionResolver::find_and_execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// False only when there was nothing to trigger.
    pub found: bool,
    /// Title of the entry that was finally triggered.
    pub action: Option<String>,
    /// Title of the action menu descended through, if any.
    pub via: Option<String>,
    /// Controller response to the final trigger.
    pub result: Option<BrowseResult>,
}

impl Resolution {
    fn not_found() -> Self {
        Self {
            found: false,
            action: None,
            via: None,
            result: None,
        }
    }

    /// True when an action ran and the controller reported no error.
    pub fn is_success(&self) -> bool {
        self.found
            && self
                .result
                .as_ref()
                .is_some_and(BrowseResult::is_completed_action)
    }
}

fn first_selectable(items: &[BrowseItem]) -> Option<&BrowseItem> {
    items.iter().find(|i| i.is_selectable())
}

fn find_titled<'a>(items: &'a [BrowseItem], title: &str) -> Option<&'a BrowseItem> {
    items
        .iter()
        .find(|i| i.is_selectable() && i.title_matches(title))
}

/// Picks and triggers the right action entry, descending one action sub-menu if needed.
pub struct ActionResolver {
    browser: Arc<dyn BrowseService>,
    session: BrowseSession,
}

impl ActionResolver {
    pub fn new(browser: Arc<dyn BrowseService>, session: BrowseSession) -> Self {
        Self { browser, session }
    }

    /// Finds and triggers an action at the current level.
    ///
    /// With `target`, looks for an entry titled `target`; otherwise walks
    /// [`DEFAULT_ACTION_PRIORITY`]. When nothing matches, the first entry of
    /// the level is triggered instead, since it is usually directly playable.
    /// If the trigger opens an action list, exactly one more level is
    /// searched for `target` (or "Play Now"), falling back to its first entry.
    ///
    /// The cursor must already be positioned on the level to search.
    pub async fn find_and_execute(
        &self,
        zone_id: &str,
        target: Option<&str>,
    ) -> ControllerResult<Resolution> {
        let page = self.browser.load(self.session.page_opts(0)).await?;

        let candidates: Vec<&str> = match target {
            Some(t) => vec![t],
            None => DEFAULT_ACTION_PRIORITY.to_vec(),
        };

        let chosen = candidates
            .iter()
            .find_map(|candidate| find_titled(&page.items, candidate));
        let item = match chosen.or_else(|| first_selectable(&page.items)) {
            Some(item) => item,
            None => {
                log::debug!(
                    "[ActionResolver] Nothing to trigger in \"{}\"",
                    page.list.title
                );
                return Ok(Resolution::not_found());
            }
        };
        if chosen.is_none() {
            log::debug!(
                "[ActionResolver] No action among {:?} in \"{}\", falling back to first entry \"{}\"",
                candidates,
                page.list.title,
                item.title
            );
        }

        self.trigger(zone_id, item, target.unwrap_or(PLAY_NOW))
            .await
    }

    /// Triggers `item`; if it opens a sub-list, triggers `wanted` (or the first entry) there.
    async fn trigger(
        &self,
        zone_id: &str,
        item: &BrowseItem,
        wanted: &str,
    ) -> ControllerResult<Resolution> {
        let Some(key) = item.item_key.as_deref() else {
            return Ok(Resolution::not_found());
        };
        let result = self
            .browser
            .browse(self.session.item_opts(zone_id, key))
            .await?;

        if !result.is_list() {
            return Ok(Resolution {
                found: true,
                action: Some(item.title.clone()),
                via: None,
                result: Some(result),
            });
        }

        let sub = self.browser.load(self.session.page_opts(0)).await?;
        let Some(entry) = find_titled(&sub.items, wanted).or_else(|| first_selectable(&sub.items))
        else {
            log::debug!(
                "[ActionResolver] Action menu \"{}\" is empty",
                item.title
            );
            return Ok(Resolution::not_found());
        };
        let Some(entry_key) = entry.item_key.as_deref() else {
            return Ok(Resolution::not_found());
        };

        let final_result = self
            .browser
            .browse(self.session.item_opts(zone_id, entry_key))
            .await?;
        log::debug!(
            "[ActionResolver] Triggered \"{}\" via \"{}\"",
            entry.title,
            item.title
        );

        Ok(Resolution {
            found: true,
            action: Some(entry.title.clone()),
            via: Some(item.title.clone()),
            result: Some(final_result),
        })
    }
}

//! Walks a sequence of titles through the controller's browse hierarchy.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::controller::{BrowseItem, BrowseResult, BrowseService};
use crate::error::{SpindleError, SpindleResult};

use super::resolver::{ActionResolver, Resolution};
use super::BrowseSession;

/// What a successful navigation ended with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationOutcome {
    /// Action entry that was triggered, if the resolver picked one.
    pub action: Option<String>,
    /// Confirmation message from the controller, if any.
    pub message: Option<String>,
}

/// One navigation attempt from the hierarchy root down a path of titles.
///
/// Callers must hold the [`BrowseSerializer`](super::BrowseSerializer) for
/// the whole call.
#[async_trait]
pub trait Navigate: Send + Sync {
    /// Navigates `path` for `zone_id`, then triggers `action` (or the default action).
    ///
    /// # Errors
    ///
    /// - [`SpindleError::PathNotFound`] if a title is missing at some level or
    ///   no action could be triggered at the end of the path
    /// - [`SpindleError::Transport`] for controller failures and error messages
    /// - [`SpindleError::InvalidRequest`] for an empty path
    async fn browse_path(
        &self,
        zone_id: &str,
        path: &[String],
        action: Option<&str>,
    ) -> SpindleResult<NavigationOutcome>;
}

/// [`Navigate`] implementation driving a [`BrowseService`].
pub struct PathNavigator {
    browser: Arc<dyn BrowseService>,
    session: BrowseSession,
    resolver: ActionResolver,
}

impl PathNavigator {
    pub fn new(browser: Arc<dyn BrowseService>, session: BrowseSession) -> Self {
        let resolver = ActionResolver::new(Arc::clone(&browser), session.clone());
        Self {
            browser,
            session,
            resolver,
        }
    }

    /// Pages through the current level until an entry titled `title` shows up.
    async fn find_in_level(&self, title: &str) -> SpindleResult<Option<BrowseItem>> {
        let mut offset = 0;
        loop {
            let page = self.browser.load(self.session.page_opts(offset)).await?;
            let fetched = page.items.len();
            let total = page.list.count;

            if let Some(item) = page
                .items
                .into_iter()
                .find(|i| i.is_selectable() && i.title_matches(title))
            {
                return Ok(Some(item));
            }

            offset += fetched;
            if fetched == 0 || offset >= total {
                return Ok(None);
            }
        }
    }

    /// Interprets the response to browsing into the last title of the path.
    async fn finish(
        &self,
        zone_id: &str,
        depth: usize,
        result: BrowseResult,
        action: Option<&str>,
    ) -> SpindleResult<NavigationOutcome> {
        if let Some(err) = error_message(&result) {
            return Err(SpindleError::Transport(err));
        }

        if !result.is_list() {
            if action.is_some() {
                log::debug!("[Navigator] Path end triggered directly, no action menu to search");
            }
            return Ok(NavigationOutcome {
                action: None,
                message: result.message,
            });
        }

        let resolution = self.resolver.find_and_execute(zone_id, action).await?;
        let wanted = action.unwrap_or("default action").to_string();
        let Resolution {
            found,
            action: triggered,
            result,
            ..
        } = resolution;

        let Some(result) = result.filter(|_| found) else {
            return Err(SpindleError::PathNotFound {
                level: depth,
                title: wanted,
            });
        };
        if let Some(err) = error_message(&result) {
            return Err(SpindleError::Transport(err));
        }
        if !result.is_completed_action() {
            log::debug!(
                "[Navigator] \"{}\" opened another menu, not descending further",
                triggered.as_deref().unwrap_or_default()
            );
            return Err(SpindleError::PathNotFound {
                level: depth,
                title: wanted,
            });
        }

        Ok(NavigationOutcome {
            action: triggered,
            message: result.message,
        })
    }
}

fn error_message(result: &BrowseResult) -> Option<String> {
    result.is_error.then(|| {
        result
            .message
            .clone()
            .unwrap_or_else(|| "controller reported an error".to_string())
    })
}

#[async_trait]
impl Navigate for PathNavigator {
    async fn browse_path(
        &self,
        zone_id: &str,
        path: &[String],
        action: Option<&str>,
    ) -> SpindleResult<NavigationOutcome> {
        let Some(last) = path.len().checked_sub(1) else {
            return Err(SpindleError::InvalidRequest("browse path is empty".into()));
        };

        self.browser.browse(self.session.root_opts(zone_id)).await?;

        for (level, title) in path.iter().enumerate() {
            let Some(item) = self.find_in_level(title).await? else {
                log::debug!("[Navigator] \"{}\" not found at level {}", title, level);
                return Err(SpindleError::PathNotFound {
                    level,
                    title: title.clone(),
                });
            };
            let Some(key) = item.item_key.as_deref() else {
                return Err(SpindleError::PathNotFound {
                    level,
                    title: title.clone(),
                });
            };

            let result = self
                .browser
                .browse(self.session.item_opts(zone_id, key))
                .await?;

            if level == last {
                return self.finish(zone_id, path.len(), result, action).await;
            }
            if !result.is_list() {
                // An intermediate title must open a list; anything else means the path is wrong.
                return Err(SpindleError::PathNotFound {
                    level,
                    title: title.clone(),
                });
            }
        }

        // The loop always returns at the last level.
        Err(SpindleError::Internal("navigation ended without a result".into()))
    }
}

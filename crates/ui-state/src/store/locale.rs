//! UI language and distance unit

use super::UiControllerStore;
use crate::error::{Result, UiError};
use crate::formatter::build_language_display;
use crate::options::Unit;
use crate::transitions::Channel;

impl UiControllerStore {
    /// Switch the UI language
    ///
    /// Every localized label is rebuilt and the selected content is fetched
    /// again so the bottom view never mixes languages.
    pub async fn set_locale(&self, locale: &str) -> Result<()> {
        if !i18n::is_supported(locale) {
            return Err(UiError::Precondition(format!("Unsupported locale {}", locale)));
        }
        tracing::info!("Switching UI language to {}", locale);

        // Older content lookups would land in the previous language
        self.begin(Channel::Content);
        let selected = self.state().controller.selected_content;
        let content = match &selected {
            Some(selected) => self.localized_content(selected, locale).await,
            None => None,
        };

        self.apply(|d| {
            d.state.controller.preferred_language = locale.to_string();
            d.state.controller.language = locale.to_string();
            d.state.language_selector.selected_language = build_language_display(locale);
            d.collapse_selectors();
            if let Some(content) = content {
                if d.state.controller.selected_content == selected {
                    d.state.bottom_view.content = Some(content);
                }
            }
            d.relocalize();
        })
        .await;

        self.dispatcher.set_language(locale);
        Ok(())
    }

    /// Switch the distance unit of direction summaries
    pub async fn set_unit(&self, unit: Unit) {
        self.apply(|d| {
            d.state.controller.unit = unit;
            if d.state.bottom_view.direction_content.is_some() {
                d.state.bottom_view.direction_content = d.direction_summary();
            }
        })
        .await;
    }
}

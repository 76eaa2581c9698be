//! Selected content and the bottom view

use map_api::{MapObject, PlaceDetails, Placelist};

use super::UiControllerStore;
use crate::content::{build_place_content, PlaceContent};
use crate::error::Result;
use crate::formatter::{build_place_details, build_placelist_details, build_preview};
use crate::scheduler::DeferredKey;
use crate::state::{BottomViewContent, UiStatus};
use crate::transitions::{Channel, Effect, Endpoint};

impl UiControllerStore {
    /// Place panel for `details`, adjusted by the host
    pub(crate) fn place_content(&self, details: PlaceDetails, language: &str) -> PlaceContent {
        let ui_language = self.state().controller.preferred_language;
        self.place_content_in(details, language, &ui_language)
    }

    /// Place panel with content in `language` and labels in `ui_language`
    fn place_content_in(&self, details: PlaceDetails, language: &str, ui_language: &str) -> PlaceContent {
        build_place_content(
            build_place_details(details, language),
            ui_language,
            self.options.uses24,
            &chrono::Local::now(),
            &self.localizer,
            self.interceptor.as_ref(),
        )
    }

    /// Resolve a selectable object into its place and details
    async fn fetch_place(&self, object: &MapObject) -> map_api::Result<Option<(MapObject, PlaceDetails)>> {
        match object {
            MapObject::PlacePreview(preview) => {
                let (place, details) = tokio::try_join!(
                    self.api.get_place(&preview.id),
                    self.api.get_place_details(&preview.id)
                )?;
                Ok(Some((MapObject::Place(place), details)))
            }
            MapObject::Place(place) => {
                let details = self.api.get_place_details(&place.id).await?;
                Ok(Some((object.clone(), details)))
            }
            MapObject::PlaceDetails(details) => {
                let details = self.api.get_place_details(&details.id).await?;
                Ok(Some((object.clone(), details)))
            }
            MapObject::Placelist(_) | MapObject::Venue(_) => Ok(None),
        }
    }

    /// Show a place in the bottom view
    ///
    /// The preview is displayed immediately and replaced by the full panel
    /// once the details arrive. If the lookup fails the preview stays.
    pub async fn select_place(&self, object: &MapObject) {
        let token = self.begin(Channel::Content);
        self.apply(|d| d.show_preview(object)).await;

        let (place, details) = match self.fetch_place(object).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Failed to load details of place {}: {}", object.id(), e);
                return;
            }
        };
        let content = self.place_content(details, &self.state().controller.language);

        self.apply_if_current(Channel::Content, token, |d| {
            if d.state.controller.venue.is_some() {
                d.state.bottom_view.hidden = false;
                d.hide_selectors();
            }
            d.state.bottom_view.content = Some(BottomViewContent::Place(content));
            d.state.controller.selected_content = Some(place.clone());
            d.state.map.selected_place = Some(place);
            d.state.map.markers.clear();
        })
        .await;
    }

    /// Show a placelist in the bottom view and its places on the map
    pub async fn select_placelist(&self, placelist: &Placelist) {
        let token = self.begin(Channel::Content);
        let places = match self.api.get_places_for_placelist(placelist).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!("Failed to load places of placelist {}: {}", placelist.id, e);
                return;
            }
        };
        let panel = build_placelist_details(
            placelist,
            &places,
            &self.state().controller.language,
            &self.localizer,
        );

        self.apply_if_current(Channel::Content, token, |d| {
            if d.state.controller.venue.is_some() {
                d.state.bottom_view.hidden = false;
                d.hide_selectors();
            }
            d.state.bottom_view.content = Some(BottomViewContent::Placelist(panel));
            d.state.controller.selected_content = Some(MapObject::Placelist(placelist.clone()));
            d.push(Effect::Cancel(DeferredKey::ReselectContent));
            if d.state.status() != UiStatus::InDirection {
                d.push(Effect::SelectPlacelist(placelist.clone()));
            }
        })
        .await;
    }

    /// Host request: select a place and move the camera to it
    pub async fn external_select_place(&self, object: &MapObject) {
        self.select_place(object).await;
        self.dispatcher.center_on_place(object).await;
    }

    /// Host request: select a placelist and move the camera to its venue
    pub async fn external_select_placelist(&self, placelist: &Placelist) {
        self.select_placelist(placelist).await;
        self.dispatcher.center_on_placelist(placelist).await;
    }

    /// Select a place and open the direction flow towards it
    pub async fn select_place_and_go_direction(&self, object: &MapObject) -> Result<()> {
        let already_selected = self
            .state()
            .map
            .selected_place
            .map(|selected| selected.id() == object.id())
            .unwrap_or(false);
        if !already_selected {
            self.select_place(object).await;
        }
        self.direction_button_click().await
    }

    /// A place was tapped on the map
    pub async fn on_place_click(&self, object: &MapObject) {
        match self.state().status() {
            UiStatus::Default => self.select_place(object).await,
            UiStatus::InFromSearch | UiStatus::InToSearch => {
                let endpoint = if self.state().status() == UiStatus::InFromSearch {
                    Endpoint::From
                } else {
                    Endpoint::To
                };
                if let Some(point) = object.to_direction_point() {
                    self.select_endpoint(endpoint, point).await;
                }
            }
            status => tracing::debug!("Ignoring place click in {:?}", status),
        }
    }

    /// Expand or collapse the bottom view
    pub async fn toggle_bottom_view_expand(&self) {
        self.apply(|d| {
            let expanded = !d.state.bottom_view.expanded;
            d.state.bottom_view.expanded = expanded;
            d.state.search_bar.is_hidden = expanded || d.state.status().is_direction();
        })
        .await;
    }

    /// The information button of the place panel was tapped
    pub fn on_information_button_click(&self) {
        if let Some(content) = self.state().controller.selected_content {
            self.interceptor.on_information_button_click(&content);
        }
    }

    /// The menu button was tapped
    pub fn on_menu_button_click(&self) {
        self.interceptor.on_menu_button_click();
    }

    /// Apply `centerOnPlaceId` from the options at mount
    pub async fn configure_from_api(&self) -> Result<()> {
        let Some(id) = self.options.center_on_place_id.clone() else {
            return Ok(());
        };
        let token = self.begin(Channel::Content);
        let (place, details) = tokio::try_join!(self.api.get_place(&id), self.api.get_place_details(&id))?;
        let content = self.place_content(details, &self.state().controller.language);
        let place = MapObject::Place(place);

        self.apply_if_current(Channel::Content, token, |d| {
            d.state.bottom_view.content = Some(BottomViewContent::Place(content));
            d.state.bottom_view.hidden = false;
            d.hide_selectors();
            d.state.controller.selected_content = Some(place.clone());
            d.state.map.markers.clear();
            d.push(Effect::SelectPlace {
                place,
                prevent_center: false,
            });
        })
        .await;
        Ok(())
    }

    /// Bottom view panel of `selected` rebuilt in `language`
    ///
    /// A failed lookup falls back to a preview in `language` so the panel
    /// never keeps labels of the previous language. `None` when the content
    /// has no panel to rebuild.
    pub(crate) async fn localized_content(&self, selected: &MapObject, language: &str) -> Option<BottomViewContent> {
        match selected {
            MapObject::Placelist(placelist) => match self.api.get_places_for_placelist(placelist).await {
                Ok(places) => Some(BottomViewContent::Placelist(build_placelist_details(
                    placelist,
                    &places,
                    language,
                    &self.localizer,
                ))),
                Err(e) => {
                    tracing::warn!("Failed to refresh placelist {}: {}", placelist.id, e);
                    Some(BottomViewContent::Preview(build_preview(selected, language)))
                }
            },
            MapObject::Venue(_) => None,
            other => match self.fetch_place(other).await {
                Ok(Some((_, details))) => Some(BottomViewContent::Place(
                    self.place_content_in(details, language, language),
                )),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!("Failed to refresh place {}: {}", other.id(), e);
                    Some(BottomViewContent::Preview(build_preview(selected, language)))
                }
            },
        }
    }
}

//! Main search bar and result list

use map_api::{ObjectClass, SearchObject, SearchParams, Universe};

use super::UiControllerStore;
use crate::formatter::{build_search_results, SearchResult};
use crate::scheduler::DeferredKey;
use crate::state::UiStatus;
use crate::transitions::{Channel, Effect};

impl UiControllerStore {
    /// The search field gained focus
    pub async fn search_focus(&self) {
        self.apply(|d| d.default_to_search()).await;
    }

    /// The search field lost focus
    ///
    /// Search closes after a delay unless focus moved to a direction field
    /// or a result was selected in the meantime.
    pub async fn search_blur(&self) {
        self.apply(|d| d.push(Effect::Schedule(DeferredKey::SearchBlur)))
            .await;
    }

    /// The search back button was tapped
    pub async fn search_back_button_click(&self) {
        self.apply(|d| {
            d.push(Effect::Cancel(DeferredKey::SearchBlur));
            d.search_to_default();
        })
        .await;
    }

    /// The search text changed
    ///
    /// Inside a venue an empty query shows the venue's curated results;
    /// outside a venue the search looks for venues. A failed lookup leaves
    /// the list unset.
    pub async fn search_query_change(&self, query: &str) {
        self.apply(|d| d.state.search_bar.search_query = query.to_string())
            .await;

        let token = self.begin(Channel::Search);
        let venue = self.state().controller.venue;
        let response = match &venue {
            Some(venue) if query.is_empty() => self.api.get_main_searches(Some(venue)).await,
            Some(venue) => {
                let params = SearchParams::new(query, vec![ObjectClass::Place, ObjectClass::Placelist])
                    .with_venue(Some(venue.id.clone()));
                self.api.search(params).await
            }
            None => {
                self.api
                    .search(SearchParams::new(query, vec![ObjectClass::Venue]))
                    .await
            }
        };
        let objects = match response {
            Ok(objects) => Some(objects),
            Err(e) => {
                tracing::warn!("Failed to search \"{}\": {}", query, e);
                None
            }
        };

        self.apply_if_current(Channel::Search, token, |d| {
            let language = d.content_language();
            let results = objects.map(|objects| build_search_results(&objects, &language, d.localizer()));
            d.state.search_result_list.results = results;
            d.state.search_result_list.universes = d.state.universe_selector.universes.clone();
            d.state.search_result_list.current_universe =
                d.state.universe_selector.selected_universe.clone();
            d.state.search_result_list.show_current_location = None;
        })
        .await;
    }

    /// Replace the result list with externally provided results
    pub async fn search_results_change(&self, results: Vec<SearchObject>) {
        self.begin(Channel::Search);
        self.apply(|d| {
            let built = build_search_results(&results, &d.content_language(), d.localizer());
            d.state.search_result_list.results = Some(built);
            d.state.search_result_list.show_current_location = None;
        })
        .await;
    }

    /// A result was tapped
    ///
    /// Picks an endpoint while a direction field is being edited, otherwise
    /// selects the result and leaves search.
    pub async fn select_search_result(&self, result: &SearchResult, universe: Option<Universe>) {
        match self.state().status() {
            UiStatus::InFromSearch => {
                let Some(point) = result.object.to_direction_point() else {
                    return;
                };
                self.select_from(point).await;
                if self.state().search_direction_bar.to_query.is_empty()
                    && self.state().controller.direction_to_point.is_none()
                {
                    self.direction_search_to_query_change("").await;
                }
            }
            UiStatus::InToSearch => {
                if let Some(point) = result.object.to_direction_point() {
                    self.select_to(point).await;
                }
            }
            UiStatus::InSearch => self.select_default_search_result(result, universe).await,
            status => tracing::debug!("Ignoring result selection in {:?}", status),
        }
    }

    async fn select_default_search_result(&self, result: &SearchResult, universe: Option<Universe>) {
        self.apply(|d| {
            d.push(Effect::Cancel(DeferredKey::SearchBlur));
            d.search_to_default();
        })
        .await;

        match &result.object {
            SearchObject::Place(place) => {
                let object = result.object.to_map_object();
                self.select_place(&object).await;
                self.dispatcher.center_on_place(&object).await;
                if let Some(universe) = universe {
                    self.dispatcher.set_universe(&universe);
                }
                tracing::debug!("Selected place {} from search", place.id);
            }
            SearchObject::Placelist(placelist) => self.select_placelist(placelist).await,
            SearchObject::Venue(venue) => self.dispatcher.center_on_venue(venue),
        }
    }
}

//! `UiControllerStore`: the overlay state machine
//!
//! The store owns the view-state tree and exposes one method per user, map
//! or host event. Every method commits a new snapshot through [`Draft`],
//! hands the (old, new) pair to the render callback, folds map-visible
//! changes into the dispatcher and then runs the recorded effects.
//!
//! Asynchronous lookups take a generation token for their channel before
//! awaiting and apply their result only if no later request or superseding
//! event bumped that channel in the meantime. Deferred transitions go
//! through the [`Scheduler`] and claim their key under the state lock.

mod content;
mod direction;
mod locale;
mod search;
mod venue;

use i18n::Localizer;
use map_api::{ApiService, DirectionPoint};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use crate::dispatcher::{ErrorReporter, MapActionsDispatcher};
use crate::interceptor::{CallbackInterceptor, DefaultInterceptor};
use crate::options::{UiOptions, Unit};
use crate::scheduler::{DeferredKey, Scheduler};
use crate::state::{MapState, RenderFn, UiState};
use crate::surface::{DirectionOptions, MapSurface};
use crate::transitions::{Channel, Draft, Effect};

/// Everything a store needs besides its own state
pub struct StoreContext {
    /// Normalized configuration
    pub options: UiOptions,
    /// Data service
    pub api: ApiService,
    /// Map rendering surface
    pub surface: Arc<dyn MapSurface>,
    /// Host hooks
    pub interceptor: Arc<dyn CallbackInterceptor>,
    /// UI strings
    pub localizer: Arc<Localizer>,
    /// Receives every (old, new) snapshot pair
    pub render: RenderFn<UiState>,
    /// Receives precondition failures
    pub error_reporter: Option<ErrorReporter>,
}

impl StoreContext {
    /// Context with the default interceptor and a no-op render callback
    pub fn new(
        options: UiOptions,
        api: ApiService,
        surface: Arc<dyn MapSurface>,
        localizer: Arc<Localizer>,
    ) -> Self {
        Self {
            options,
            api,
            surface,
            interceptor: Arc::new(DefaultInterceptor),
            localizer,
            render: Arc::new(|_, _| {}),
            error_reporter: None,
        }
    }

    /// Replace the host hooks
    pub fn with_interceptor(mut self, interceptor: Arc<dyn CallbackInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    /// Replace the render callback
    pub fn with_render(mut self, render: RenderFn<UiState>) -> Self {
        self.render = render;
        self
    }

    /// Replace the error reporting hook
    pub fn with_error_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.error_reporter = Some(reporter);
        self
    }
}

#[derive(Debug, Default)]
struct Generations {
    search: u64,
    direction: u64,
    content: u64,
}

impl Generations {
    fn slot(&mut self, channel: Channel) -> &mut u64 {
        match channel {
            Channel::Search => &mut self.search,
            Channel::Direction => &mut self.direction,
            Channel::Content => &mut self.content,
        }
    }

    fn bump(&mut self, channel: Channel) -> u64 {
        let slot = self.slot(channel);
        *slot += 1;
        *slot
    }

    fn current(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Search => self.search,
            Channel::Direction => self.direction,
            Channel::Content => self.content,
        }
    }

    fn is_current(&self, channel: Channel, token: u64) -> bool {
        self.current(channel) == token
    }
}

struct Inner {
    state: UiState,
    generations: Generations,
}

/// Condition checked under the state lock before a transition applies
#[derive(Debug, Clone, Copy)]
enum Guard {
    Always,
    Channel(Channel, u64),
    Deferred(DeferredKey, u64),
}

/// Central state machine of the overlay
pub struct UiControllerStore {
    this: Weak<UiControllerStore>,
    inner: RwLock<Inner>,
    api: ApiService,
    dispatcher: Arc<MapActionsDispatcher>,
    interceptor: Arc<dyn CallbackInterceptor>,
    localizer: Arc<Localizer>,
    options: UiOptions,
    scheduler: Scheduler,
    render: RenderFn<UiState>,
}

impl UiControllerStore {
    /// Build the store and its dispatcher with the localized default state
    pub fn new(context: StoreContext) -> Arc<Self> {
        let StoreContext {
            options,
            api,
            surface,
            interceptor,
            localizer,
            render,
            error_reporter,
        } = context;

        Arc::new_cyclic(|this: &Weak<UiControllerStore>| {
            let weak = this.clone();
            let mut dispatcher = MapActionsDispatcher::new(surface, api.clone(), interceptor.clone())
                .with_render(Arc::new(move |_old: &MapState, new: &MapState| {
                    if let Some(store) = weak.upgrade() {
                        store.on_map_state_change(new);
                    }
                }));
            if let Some(reporter) = error_reporter {
                dispatcher = dispatcher.with_error_reporter(reporter);
            }

            let state = UiState::new(&options, &localizer);
            Self {
                this: this.clone(),
                inner: RwLock::new(Inner {
                    state,
                    generations: Generations::default(),
                }),
                api,
                dispatcher: Arc::new(dispatcher),
                interceptor,
                localizer,
                options,
                scheduler: Scheduler::new(),
                render,
            }
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current snapshot
    pub fn state(&self) -> UiState {
        self.inner.read().state.clone()
    }

    /// Dispatcher owned by this store
    pub fn dispatcher(&self) -> &Arc<MapActionsDispatcher> {
        &self.dispatcher
    }

    /// Data service
    pub fn api(&self) -> &ApiService {
        &self.api
    }

    /// Host hooks
    pub fn interceptor(&self) -> &Arc<dyn CallbackInterceptor> {
        &self.interceptor
    }

    /// Configuration the store was built with
    pub fn options(&self) -> &UiOptions {
        &self.options
    }

    /// Direction origin
    pub fn get_from(&self) -> Option<DirectionPoint> {
        self.inner.read().state.controller.direction_from_point.clone()
    }

    /// Direction destination
    pub fn get_to(&self) -> Option<DirectionPoint> {
        self.inner.read().state.controller.direction_to_point.clone()
    }

    /// UI language
    pub fn get_locale(&self) -> String {
        self.inner.read().state.controller.preferred_language.clone()
    }

    /// UI languages with string tables
    pub fn get_available_locales(&self) -> Vec<i18n::Locale> {
        i18n::available_locales()
    }

    /// Distance unit
    pub fn get_unit(&self) -> Unit {
        self.inner.read().state.controller.unit
    }

    /// Supported distance units
    pub fn get_units(&self) -> Vec<Unit> {
        Unit::all().to_vec()
    }

    // =========================================================================
    // Transition machinery
    // =========================================================================

    /// Apply a transition and run its effects
    pub(crate) async fn apply(&self, f: impl FnOnce(&mut Draft<'_>)) {
        if let Some(effects) = self.commit(Guard::Always, f) {
            self.run_effects(effects).await;
        }
    }

    /// Apply a transition only if `token` is still current for `channel`
    pub(crate) async fn apply_if_current(
        &self,
        channel: Channel,
        token: u64,
        f: impl FnOnce(&mut Draft<'_>),
    ) -> bool {
        match self.commit(Guard::Channel(channel, token), f) {
            Some(effects) => {
                self.run_effects(effects).await;
                true
            }
            None => {
                tracing::debug!("Discarding stale {:?} response", channel);
                false
            }
        }
    }

    /// Start a request on `channel`, superseding any in flight
    pub(crate) fn begin(&self, channel: Channel) -> u64 {
        self.inner.write().generations.bump(channel)
    }

    /// Whether `token` is still current for `channel`
    pub(crate) fn is_current(&self, channel: Channel, token: u64) -> bool {
        self.inner.read().generations.is_current(channel, token)
    }

    fn commit(&self, guard: Guard, f: impl FnOnce(&mut Draft<'_>)) -> Option<Vec<Effect>> {
        let user_location = self.dispatcher.user_location();
        let (old, new, effects) = {
            let mut inner = self.inner.write();
            let allowed = match guard {
                Guard::Always => true,
                Guard::Channel(channel, token) => inner.generations.is_current(channel, token),
                Guard::Deferred(key, token) => self.scheduler.finish(key, token),
            };
            if !allowed {
                return None;
            }

            let mut draft = Draft::new(inner.state.clone(), &self.localizer, user_location);
            f(&mut draft);
            let (next, effects) = draft.finish();

            let mut remaining = Vec::with_capacity(effects.len());
            for effect in effects {
                match effect {
                    Effect::Invalidate(channel) => {
                        inner.generations.bump(channel);
                    }
                    Effect::Cancel(key) => {
                        self.scheduler.cancel(key);
                    }
                    other => remaining.push(other),
                }
            }

            let old = std::mem::replace(&mut inner.state, next.clone());
            (old, next, remaining)
        };

        if old != new {
            (self.render)(&old, &new);
            if old.map.selected_place != new.map.selected_place || old.map.markers != new.map.markers {
                self.dispatcher.sync_state(&new.map);
            }
        }
        Some(effects)
    }

    async fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SelectPlace {
                    place,
                    prevent_center,
                } => self.dispatcher.select_place(&place, prevent_center),
                Effect::SelectPlacelist(placelist) => self.dispatcher.select_placelist(&placelist).await,
                Effect::UnselectContent => self.dispatcher.unselect_content(),
                Effect::StartDirection {
                    direction,
                    options,
                    start_label,
                    end_label,
                } => self
                    .dispatcher
                    .start_direction(direction, options, start_label, end_label),
                Effect::StopDirection => self.dispatcher.stop_direction(),
                Effect::Schedule(key) => self.schedule(key),
                // Applied under the state lock by `commit`
                Effect::Cancel(_) | Effect::Invalidate(_) => {}
            }
        }
    }

    /// Mirror a dispatcher-side map change into the snapshot
    fn on_map_state_change(&self, map: &MapState) {
        let (old, new) = {
            let mut inner = self.inner.write();
            if inner.state.map == *map {
                return;
            }
            let old = inner.state.clone();
            inner.state.map = map.clone();
            (old, inner.state.clone())
        };
        (self.render)(&old, &new);
    }

    // =========================================================================
    // Deferred transitions
    // =========================================================================

    fn schedule(&self, key: DeferredKey) {
        let weak = self.this.clone();
        self.scheduler.schedule(key, move |token| async move {
            if let Some(store) = weak.upgrade() {
                store.fire(key, token).await;
            }
        });
    }

    /// Claim a deferred key without changing the snapshot
    fn claim(&self, key: DeferredKey, token: u64) -> Option<UiState> {
        let inner = self.inner.write();
        if self.scheduler.finish(key, token) {
            Some(inner.state.clone())
        } else {
            None
        }
    }

    async fn fire(&self, key: DeferredKey, token: u64) {
        tracing::debug!("Deferred {:?} fired", key);
        match key {
            DeferredKey::FromBlur | DeferredKey::ToBlur => {
                let applied = self.commit(Guard::Deferred(key, token), |d| {
                    let bar = &mut d.state.search_direction_bar;
                    if key == DeferredKey::FromBlur {
                        bar.is_from_focus = false;
                    } else {
                        bar.is_to_focus = false;
                    }
                    if !bar.is_from_focus && !bar.is_to_focus {
                        d.state.search_result_list.is_hidden = true;
                        d.clear_results();
                        d.state.search_container.is_in_search = false;
                        d.push(Effect::Invalidate(Channel::Search));
                    }
                });
                if let Some(effects) = applied {
                    self.run_effects(effects).await;
                }
            }
            DeferredKey::SearchBlur => {
                let applied = self.commit(Guard::Deferred(key, token), |d| {
                    let bar = &d.state.search_direction_bar;
                    if !bar.is_from_focus && !bar.is_to_focus && d.state.status() == crate::UiStatus::InSearch {
                        d.search_to_default();
                    }
                });
                if let Some(effects) = applied {
                    self.run_effects(effects).await;
                }
            }
            DeferredKey::StopDirection => {
                if self.claim(key, token).is_some() {
                    self.dispatcher.stop_direction();
                }
            }
            DeferredKey::RestartDirection => {
                let Some(state) = self.claim(key, token) else {
                    return;
                };
                let Some(direction) = state.controller.direction.clone() else {
                    return;
                };
                let labels = Draft::new(state.clone(), &self.localizer, None).direction_labels();
                let options = DirectionOptions::default()
                    .with_center_on_start(state.controller.last_exited_venue.is_none())
                    .with_display_starting_floor(false);
                self.dispatcher
                    .start_direction(direction, options, labels.0, labels.1);
            }
            DeferredKey::ReselectContent => {
                let Some(state) = self.claim(key, token) else {
                    return;
                };
                match state.controller.selected_content {
                    Some(map_api::MapObject::Placelist(placelist)) => {
                        self.dispatcher.select_placelist(&placelist).await
                    }
                    Some(map_api::MapObject::Venue(_)) | None => {}
                    Some(place) => self.dispatcher.select_place(&place, true),
                }
            }
        }
    }

    /// Whether a deferred transition is waiting for `key`
    pub fn is_pending(&self, key: DeferredKey) -> bool {
        self.scheduler.is_pending(key)
    }
}

impl std::fmt::Debug for UiControllerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiControllerStore")
            .field("status", &self.inner.read().state.controller.status)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

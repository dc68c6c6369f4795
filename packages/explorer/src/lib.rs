#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The province/city/location drill-down map component.
//!
//! An [`Explorer`] starts in the loading state holding an unopened map
//! surface. [`Explorer::mount`] fetches the boundary dataset, the map token,
//! and the location listings concurrently. The [`view::DrillView`] opens as
//! soon as the boundaries and token are in; listings that arrive later are
//! handed to the open view. Unmounting while a fetch is outstanding empties
//! the slot the fetch would write into, so its result is dropped on arrival.

pub mod panel;
pub mod view;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use cowork_map_backend::{
    BackendError,
    boundary::BoundarySource,
    locations::LocationService,
    token::{ResolvedToken, TokenService, resolve_token},
};
use cowork_map_location_models::LocationRecord;
use cowork_map_province::registry::ProvinceRegistry;
use cowork_map_viewport::{MapSurface, ViewportConfig};
use geojson::FeatureCollection;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use crate::view::DrillView;

/// Errors that can occur while using the explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A backend collaborator failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The map data has not arrived yet.
    #[error("Map is still loading")]
    NotReady,

    /// The explorer has been unmounted.
    #[error("Map has been unmounted")]
    Unmounted,
}

/// The external services the explorer loads from.
pub struct Collaborators {
    /// Source of the province boundary `GeoJSON`.
    pub boundaries: Box<dyn BoundarySource>,
    /// Map access token endpoint.
    pub tokens: Box<dyn TokenService>,
    /// Location listings query.
    pub locations: Box<dyn LocationService>,
    /// Token substituted when the token service fails.
    pub fallback_token: String,
}

/// Everything the map needs in memory before it can open.
#[derive(Debug, Clone)]
pub struct MountData {
    /// Raw province boundaries, normalized when the view opens.
    pub boundaries: FeatureCollection,
    /// Map token and where it came from.
    pub token: ResolvedToken,
    /// Location listings. May be empty and filled in later.
    pub records: Vec<LocationRecord>,
}

fn listings_or_empty(records: Result<Vec<LocationRecord>, BackendError>) -> Vec<LocationRecord> {
    records.unwrap_or_else(|e| {
        log::warn!("Location query failed ({e}); showing no listings");
        Vec::new()
    })
}

/// Fetches the three mount-time collaborators concurrently and waits for
/// all of them. Used by one-shot consumers that need the listings up front;
/// [`Explorer::mount`] does not wait for the listings before opening.
///
/// A token failure is replaced by the fallback token and a listing failure
/// by an empty list, both with a warning.
///
/// # Errors
///
/// Returns [`ExplorerError::Backend`] if the boundary dataset cannot be
/// loaded; without it there is nothing to draw.
pub async fn fetch_mount_data(collaborators: &Collaborators) -> Result<MountData, ExplorerError> {
    let (boundaries, token, records) = tokio::join!(
        collaborators.boundaries.fetch_boundaries(),
        resolve_token(collaborators.tokens.as_ref(), &collaborators.fallback_token),
        collaborators.locations.fetch_locations(),
    );

    Ok(MountData {
        boundaries: boundaries?,
        token,
        records: listings_or_empty(records),
    })
}

/// Coarse lifecycle of an [`Explorer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LoadState {
    /// Waiting on the boundaries or the token; only a placeholder shows.
    Loading,
    /// The drill-down view is open.
    Ready,
    /// Torn down; nothing is drawn again.
    Unmounted,
}

enum Slot<S: MapSurface> {
    Loading(S),
    Ready(Box<DrillView<S>>),
    Unmounted,
}

impl<S: MapSurface> Slot<S> {
    const fn state(&self) -> LoadState {
        match self {
            Self::Loading(_) => LoadState::Loading,
            Self::Ready(_) => LoadState::Ready,
            Self::Unmounted => LoadState::Unmounted,
        }
    }
}

/// The drill-down component.
pub struct Explorer<S: MapSurface> {
    slot: Arc<Mutex<Slot<S>>>,
    registry: ProvinceRegistry,
    config: ViewportConfig,
}

fn lock<S: MapSurface>(slot: &Mutex<Slot<S>>) -> MutexGuard<'_, Slot<S>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Opens the view in `slot` if it is still loading. `Err` carries the state
/// to report when this mount did not open it.
fn open_view<S: MapSurface>(
    slot: &Weak<Mutex<Slot<S>>>,
    registry: ProvinceRegistry,
    config: ViewportConfig,
    data: MountData,
) -> Result<(), LoadState> {
    let Some(slot) = slot.upgrade() else {
        log::debug!("Explorer dropped before map data arrived; discarding");
        return Err(LoadState::Unmounted);
    };

    let mut guard = lock(&slot);
    match std::mem::replace(&mut *guard, Slot::Unmounted) {
        Slot::Loading(surface) => {
            *guard = Slot::Ready(Box::new(DrillView::open(surface, registry, config, data)));
            Ok(())
        }
        Slot::Unmounted => {
            log::debug!("Explorer unmounted before map data arrived; discarding");
            Err(LoadState::Unmounted)
        }
        ready @ Slot::Ready(_) => {
            *guard = ready;
            Err(LoadState::Ready)
        }
    }
}

fn deliver_listings<S: MapSurface>(
    slot: &Weak<Mutex<Slot<S>>>,
    records: Vec<LocationRecord>,
) -> LoadState {
    let Some(slot) = slot.upgrade() else {
        log::debug!("Explorer dropped before listings arrived; discarding");
        return LoadState::Unmounted;
    };

    let mut guard = lock(&slot);
    match &mut *guard {
        Slot::Ready(view) => view.set_records(records),
        Slot::Loading(_) | Slot::Unmounted => {
            log::debug!("Explorer unmounted before listings arrived; discarding");
        }
    }
    guard.state()
}

impl<S: MapSurface> Explorer<S> {
    /// Creates the component in the loading state.
    pub fn new(surface: S, registry: ProvinceRegistry, config: ViewportConfig) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Loading(surface))),
            registry,
            config,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        lock(&self.slot).state()
    }

    /// Returns the one-shot load. Nothing is retried; if the boundary
    /// dataset fails the explorer stays in [`LoadState::Loading`].
    ///
    /// The view opens once the boundaries and token resolve. If the
    /// listings are still outstanding at that point the map starts empty and
    /// the future completes when they arrive.
    ///
    /// The future holds only a weak reference to the explorer, so it may be
    /// polled after the explorer is unmounted or dropped. Its results are
    /// then discarded.
    pub fn mount(&self, collaborators: Collaborators) -> impl Future<Output = LoadState> + use<S> {
        let slot = Arc::downgrade(&self.slot);
        let registry = self.registry.clone();
        let config = self.config.clone();

        async move {
            let Collaborators {
                boundaries,
                tokens,
                locations,
                fallback_token,
            } = collaborators;

            let mut listings = locations.fetch_locations();
            let mut map_data = std::pin::pin!(async {
                tokio::join!(
                    boundaries.fetch_boundaries(),
                    resolve_token(tokens.as_ref(), &fallback_token),
                )
            });

            let mut early = None;
            let (features, token) = loop {
                tokio::select! {
                    biased;
                    out = &mut map_data => break out,
                    records = &mut listings, if early.is_none() => early = Some(records),
                }
            };

            let features = match features {
                Ok(features) => features,
                Err(e) => {
                    log::warn!("Map data failed to load ({e}); staying in loading state");
                    return slot
                        .upgrade()
                        .map_or(LoadState::Unmounted, |slot| lock(&slot).state());
                }
            };

            let arrived = early.is_some();
            let data = MountData {
                boundaries: features,
                token,
                records: early.map(listings_or_empty).unwrap_or_default(),
            };
            if let Err(state) = open_view(&slot, registry, config, data) {
                return state;
            }
            if arrived {
                return LoadState::Ready;
            }

            log::debug!("Map open; waiting on location listings");
            let records = listings_or_empty(listings.await);
            deliver_listings(&slot, records)
        }
    }

    /// Runs `f` against the mounted view.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::NotReady`] while loading and
    /// [`ExplorerError::Unmounted`] after unmount.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut DrillView<S>) -> R) -> Result<R, ExplorerError> {
        match &mut *lock(&self.slot) {
            Slot::Ready(view) => Ok(f(&mut **view)),
            Slot::Loading(_) => Err(ExplorerError::NotReady),
            Slot::Unmounted => Err(ExplorerError::Unmounted),
        }
    }

    /// Re-clamps pan bounds after the host resized the map.
    ///
    /// # Errors
    ///
    /// Same as [`Self::with_view`].
    pub fn on_resize(&self) -> Result<(), ExplorerError> {
        self.with_view(DrillView::on_resize)
    }

    /// Re-clamps pan bounds after a zoom change.
    ///
    /// # Errors
    ///
    /// Same as [`Self::with_view`].
    pub fn on_zoom(&self) -> Result<(), ExplorerError> {
        self.with_view(DrillView::on_zoom)
    }

    /// Tears the component down and returns the surface, or `None` if it
    /// was already unmounted.
    pub fn unmount(&self) -> Option<S> {
        let previous = std::mem::replace(&mut *lock(&self.slot), Slot::Unmounted);
        match previous {
            Slot::Loading(surface) => {
                log::debug!("Unmounted while loading");
                Some(surface)
            }
            Slot::Ready(view) => Some(view.close()),
            Slot::Unmounted => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, collaborators};
    use cowork_map_backend::{
        boundary::StaticBoundarySource, locations::StaticLocationService,
        token::{StaticTokenService, TokenSource},
    };
    use cowork_map_viewport::headless::HeadlessSurface;
    use cowork_map_viewport_models::ScreenSize;
    use tokio::sync::oneshot;

    fn explorer() -> Explorer<HeadlessSurface> {
        Explorer::new(
            HeadlessSurface::new(ScreenSize::new(1024.0, 768.0)),
            ProvinceRegistry::bulgaria(),
            ViewportConfig::default(),
        )
    }

    #[tokio::test]
    async fn mount_moves_from_loading_to_ready() {
        let explorer = explorer();
        assert_eq!(explorer.load_state(), LoadState::Loading);
        assert!(matches!(
            explorer.with_view(|_| ()),
            Err(ExplorerError::NotReady)
        ));

        assert_eq!(explorer.mount(collaborators()).await, LoadState::Ready);
        assert_eq!(explorer.load_state(), LoadState::Ready);

        let token = explorer.with_view(|v| v.token().clone()).unwrap();
        assert_eq!(token.source, TokenSource::Service);
        let surface_token = explorer
            .with_view(|v| v.session().surface().access_token().map(ToString::to_string))
            .unwrap();
        assert_eq!(surface_token.as_deref(), Some("pk.live"));
    }

    #[tokio::test]
    async fn token_failure_uses_fallback() {
        let explorer = explorer();
        let collaborators = Collaborators {
            tokens: Box::new(StaticTokenService::unavailable()),
            ..collaborators()
        };
        assert_eq!(explorer.mount(collaborators).await, LoadState::Ready);

        let token = explorer.with_view(|v| v.token().clone()).unwrap();
        assert_eq!(token.token, "pk.fallback");
        assert_eq!(token.source, TokenSource::Fallback);
    }

    #[tokio::test]
    async fn boundary_failure_stays_loading() {
        let explorer = explorer();
        let collaborators = Collaborators {
            boundaries: Box::new(StaticBoundarySource::unavailable()),
            ..collaborators()
        };
        assert_eq!(explorer.mount(collaborators).await, LoadState::Loading);
        assert_eq!(explorer.load_state(), LoadState::Loading);
    }

    #[tokio::test]
    async fn listing_failure_yields_empty_map() {
        let data = fetch_mount_data(&Collaborators {
            locations: Box::new(FailingLocations),
            ..collaborators()
        })
        .await
        .unwrap();
        assert!(data.records.is_empty());
        assert_eq!(data.boundaries.features.len(), 3);
    }

    struct FailingLocations;

    #[async_trait::async_trait]
    impl LocationService for FailingLocations {
        async fn fetch_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
            Err(BackendError::Service {
                message: "down".to_string(),
            })
        }
    }

    struct LateLocations(Mutex<Option<oneshot::Receiver<Vec<LocationRecord>>>>);

    impl LateLocations {
        fn new() -> (oneshot::Sender<Vec<LocationRecord>>, Self) {
            let (tx, rx) = oneshot::channel();
            (tx, Self(Mutex::new(Some(rx))))
        }
    }

    #[async_trait::async_trait]
    impl LocationService for LateLocations {
        async fn fetch_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
            let rx = self.0.lock().unwrap().take();
            match rx {
                Some(rx) => rx.await.map_err(|e| BackendError::Service {
                    message: e.to_string(),
                }),
                None => Err(BackendError::Service {
                    message: "already fetched".to_string(),
                }),
            }
        }
    }

    /// Polls `fut` once more without waiting on it.
    async fn step<F: Future + Unpin>(fut: &mut F) -> Option<F::Output> {
        tokio::select! {
            biased;
            out = &mut *fut => Some(out),
            () = tokio::task::yield_now() => None,
        }
    }

    fn marker_ids(explorer: &Explorer<HeadlessSurface>) -> Vec<String> {
        let mut ids = explorer
            .with_view(|v| v.session().markers().map(|m| m.id.clone()).collect::<Vec<_>>())
            .unwrap();
        ids.sort_unstable();
        ids
    }

    #[tokio::test]
    async fn map_opens_before_listings_arrive() {
        let explorer = explorer();
        let (tx, locations) = LateLocations::new();
        let mut mount = Box::pin(explorer.mount(Collaborators {
            locations: Box::new(locations),
            ..collaborators()
        }));

        for _ in 0..10 {
            assert!(step(&mut mount).await.is_none(), "finished without listings");
        }
        assert_eq!(explorer.load_state(), LoadState::Ready);
        assert!(marker_ids(&explorer).is_empty());

        tx.send(test_support::records()).unwrap();
        assert_eq!(mount.await, LoadState::Ready);
        assert_eq!(marker_ids(&explorer), vec!["province:Sofia", "province:Varna"]);
    }

    #[tokio::test]
    async fn listings_arriving_after_unmount_are_discarded() {
        let explorer = explorer();
        let (tx, locations) = LateLocations::new();
        let mut mount = Box::pin(explorer.mount(Collaborators {
            locations: Box::new(locations),
            ..collaborators()
        }));

        for _ in 0..10 {
            assert!(step(&mut mount).await.is_none());
        }
        assert_eq!(explorer.load_state(), LoadState::Ready);

        let surface = explorer.unmount().unwrap();
        assert!(surface.is_destroyed());

        tx.send(test_support::records()).unwrap();
        assert_eq!(mount.await, LoadState::Unmounted);
        assert_eq!(surface.markers().count(), 0);
    }

    #[tokio::test]
    async fn result_arriving_after_unmount_is_discarded() {
        let explorer = explorer();
        let pending = explorer.mount(collaborators());

        let surface = explorer.unmount().unwrap();
        assert!(surface.commands().is_empty(), "surface touched before load");

        assert_eq!(pending.await, LoadState::Unmounted);
        assert_eq!(explorer.load_state(), LoadState::Unmounted);
        assert!(matches!(
            explorer.with_view(|_| ()),
            Err(ExplorerError::Unmounted)
        ));
    }

    #[tokio::test]
    async fn result_arriving_after_drop_is_discarded() {
        let explorer = explorer();
        let pending = explorer.mount(collaborators());
        drop(explorer);
        assert_eq!(pending.await, LoadState::Unmounted);
    }

    #[tokio::test]
    async fn unmount_after_ready_destroys_surface() {
        let explorer = explorer();
        explorer.mount(collaborators()).await;

        let surface = explorer.unmount().unwrap();
        assert!(surface.is_destroyed());
        assert_eq!(surface.markers().count(), 0);
        assert!(explorer.unmount().is_none());
    }

    #[tokio::test]
    async fn resize_needs_a_mounted_view() {
        let explorer = explorer();
        assert!(matches!(explorer.on_resize(), Err(ExplorerError::NotReady)));

        explorer.mount(collaborators()).await;
        explorer
            .with_view(|v| v.surface_mut().resize(ScreenSize::new(200.0, 150.0)))
            .unwrap();
        explorer.on_resize().unwrap();
        explorer.on_zoom().unwrap();
        let bounds = explorer.with_view(|v| v.session().max_bounds()).unwrap();
        assert!(bounds.is_some());
    }

    #[tokio::test]
    async fn empty_listing_service_still_mounts() {
        let explorer = explorer();
        let collaborators = Collaborators {
            locations: Box::new(StaticLocationService::new(vec![])),
            ..collaborators()
        };
        assert_eq!(explorer.mount(collaborators).await, LoadState::Ready);
        let markers = explorer
            .with_view(|v| v.session().markers().count())
            .unwrap();
        assert_eq!(markers, 0);
    }
}

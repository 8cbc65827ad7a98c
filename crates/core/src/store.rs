//! Session state container.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    catalog::Catalog,
    game::{GameState, SelectionEngine, SelectionError},
    models::{Destination, FindingResult, Vehicle},
    remote::{PlanetProvider, VehicleProvider},
    workflow::{SearchWorkflow, WorkflowError},
};

/// Errors surfaced by [`GameStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The catalog could not be loaded; the session cannot start.
    #[error("failed to load catalog: {0:#}")]
    Fetch(anyhow::Error),
    /// A selection was refused.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// A search was requested before all destinations were selected.
    #[error("Please select all 4 destinations")]
    IncompleteSelection,
    /// A remote call failed during the search.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// Another search for this session has not finished yet.
    #[error("a search is already in progress")]
    SearchInProgress,
    /// The session was reset while the search was in flight.
    #[error("search result discarded after reset")]
    SearchSuperseded,
}

/// Coarse position of a session in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No selections yet.
    Idle,
    /// Between one and three selections.
    Selecting,
    /// All selections made, no result yet.
    Ready,
    /// A search is in flight.
    Searching,
    /// A search completed with a result.
    Resolved,
}

/// Read-only view of a session at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Catalog the session was initialized with.
    pub catalog: Arc<Catalog>,
    /// Current selections, inventory and elapsed time.
    pub state: GameState,
    /// Result of the last completed search.
    pub result: Option<FindingResult>,
    /// Last user-facing error message.
    pub error: Option<String>,
    /// Whether a search is in flight.
    pub searching: bool,
}

impl StoreSnapshot {
    /// Lifecycle phase derived from the snapshot.
    pub fn phase(&self) -> Phase {
        if self.searching {
            Phase::Searching
        } else if self.result.is_some() {
            Phase::Resolved
        } else if self.state.is_complete() {
            Phase::Ready
        } else if self.state.is_empty() {
            Phase::Idle
        } else {
            Phase::Selecting
        }
    }
}

#[derive(Default)]
struct Inner {
    snapshot: StoreSnapshot,
    generation: u64,
}

/// Owns one session's state and serializes every mutation through a lock.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct GameStore {
    inner: Arc<Mutex<Inner>>,
    updates: Arc<watch::Sender<StoreSnapshot>>,
    workflow: SearchWorkflow,
}

impl GameStore {
    /// Create an empty store that searches through `workflow`.
    pub fn new(workflow: SearchWorkflow) -> Self {
        let (updates, _) = watch::channel(StoreSnapshot::default());
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            updates: Arc::new(updates),
            workflow,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.lock().snapshot.clone()
    }

    /// Receive a new snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.updates.subscribe()
    }

    /// Fetch the catalog from the providers and initialize the session.
    pub async fn load(
        &self,
        planets: &dyn PlanetProvider,
        vehicles: &dyn VehicleProvider,
    ) -> Result<(), StoreError> {
        match Catalog::load(planets, vehicles).await {
            Ok(catalog) => {
                self.install(catalog);
                Ok(())
            }
            Err(err) => {
                let err = StoreError::Fetch(err);
                warn!(error = %err, "Catalog load failed");
                self.mutate(|snapshot| snapshot.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Start a fresh session over the given catalog.
    pub fn initialize(&self, destinations: Vec<Destination>, vehicles: Vec<Vehicle>) {
        self.install(Catalog::new(destinations, vehicles));
    }

    fn install(&self, catalog: Catalog) {
        let catalog = Arc::new(catalog);
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.snapshot = StoreSnapshot {
            state: GameState::new(&catalog.vehicles),
            catalog,
            ..StoreSnapshot::default()
        };
        info!(generation = inner.generation, "Session initialized");
        self.publish(&inner);
    }

    /// Record one selection, or store the refusal as the current error.
    pub fn apply_selection(
        &self,
        destination: &Destination,
        vehicle: &Vehicle,
    ) -> Result<GameState, StoreError> {
        let mut inner = self.inner.lock();
        match SelectionEngine::select(&inner.snapshot.state, destination, vehicle) {
            Ok(state) => {
                inner.snapshot.state = state.clone();
                inner.snapshot.error = None;
                self.publish(&inner);
                Ok(state)
            }
            Err(err) => {
                info!(
                    destination = %destination.name,
                    vehicle = %vehicle.name,
                    reason = %err,
                    "Selection rejected"
                );
                inner.snapshot.error = Some(err.to_string());
                self.publish(&inner);
                Err(err.into())
            }
        }
    }

    /// Submit the four selections and store the outcome.
    ///
    /// Selections are left untouched whatever the outcome. A response that
    /// arrives after [`GameStore::reset`] is dropped with
    /// [`StoreError::SearchSuperseded`].
    pub async fn search(&self) -> Result<FindingResult, StoreError> {
        let (selections, generation) = {
            let mut inner = self.inner.lock();
            if inner.snapshot.searching {
                return Err(StoreError::SearchInProgress);
            }
            if !inner.snapshot.state.is_complete() {
                let err = StoreError::IncompleteSelection;
                inner.snapshot.error = Some(err.to_string());
                self.publish(&inner);
                return Err(err);
            }
            inner.snapshot.searching = true;
            inner.snapshot.error = None;
            self.publish(&inner);
            (inner.snapshot.state.selections().to_vec(), inner.generation)
        };

        let mut in_flight = InFlight {
            store: self,
            generation,
            settled: false,
        };
        let outcome = self.workflow.run(&selections).await;
        in_flight.settled = true;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            info!(
                generation,
                current = inner.generation,
                "Discarding stale search response"
            );
            return Err(StoreError::SearchSuperseded);
        }
        inner.snapshot.searching = false;
        let result = match outcome {
            Ok(result) => {
                inner.snapshot.result = Some(result.clone());
                Ok(result)
            }
            Err(err) => {
                inner.snapshot.error = Some(err.to_string());
                Err(err.into())
            }
        };
        self.publish(&inner);
        result
    }

    /// Return to the initial post-load state of the current catalog.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        let catalog = Arc::clone(&inner.snapshot.catalog);
        inner.snapshot = StoreSnapshot {
            state: GameState::new(&catalog.vehicles),
            catalog,
            ..StoreSnapshot::default()
        };
        info!(generation = inner.generation, "Session reset");
        self.publish(&inner);
    }

    /// Drop the current error message only.
    pub fn clear_error(&self) {
        self.mutate(|snapshot| snapshot.error = None);
    }

    fn mutate(&self, apply: impl FnOnce(&mut StoreSnapshot)) {
        let mut inner = self.inner.lock();
        apply(&mut inner.snapshot);
        self.publish(&inner);
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.snapshot.clone());
    }

    fn abandon_search(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation == generation && inner.snapshot.searching {
            warn!(generation, "Search cancelled before completion");
            inner.snapshot.searching = false;
            self.publish(&inner);
        }
    }
}

/// Clears the searching flag if a search future is dropped mid-flight.
struct InFlight<'a> {
    store: &'a GameStore,
    generation: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store.abandon_search(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::REQUIRED_SELECTIONS,
        models::FindingStatus,
        remote::{RawOutcome, SearchExecutor, Token, TokenProvider},
    };
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    struct Tokens {
        fail: AtomicBool,
    }

    #[async_trait]
    impl TokenProvider for Tokens {
        async fn acquire(&self) -> Result<Token> {
            if self.fail.load(Ordering::SeqCst) {
                Err(anyhow!("token endpoint unreachable"))
            } else {
                Ok(Token::new("tok"))
            }
        }
    }

    /// Answers with the configured outcome once released.
    struct Executor {
        outcome: Mutex<RawOutcome>,
        fail: AtomicBool,
        gated: bool,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SearchExecutor for Executor {
        async fn execute(
            &self,
            _token: &Token,
            selections: &[crate::models::Selection],
        ) -> Result<RawOutcome> {
            assert_eq!(selections.len(), REQUIRED_SELECTIONS);
            if self.gated {
                self.started.notify_one();
                self.release.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!(
                    "find endpoint returned 400 Bad Request: Token not initialized"
                ));
            }
            Ok(self.outcome.lock().clone())
        }
    }

    struct Harness {
        store: GameStore,
        tokens: Arc<Tokens>,
        executor: Arc<Executor>,
    }

    fn harness(gated: bool) -> Harness {
        let tokens = Arc::new(Tokens {
            fail: AtomicBool::new(false),
        });
        let executor = Arc::new(Executor {
            outcome: Mutex::new(RawOutcome {
                destination_name: Some("Donlon".to_string()),
                status: Some("success".to_string()),
                error: None,
            }),
            fail: AtomicBool::new(false),
            gated,
            started: Notify::new(),
            release: Notify::new(),
        });
        let store = GameStore::new(SearchWorkflow::new(tokens.clone(), executor.clone()));
        store.initialize(destinations(), vehicles());
        Harness {
            store,
            tokens,
            executor,
        }
    }

    fn destinations() -> Vec<Destination> {
        vec![
            Destination::new("Donlon", 100),
            Destination::new("Enchai", 200),
            Destination::new("Jebing", 300),
            Destination::new("Sapir", 400),
        ]
    }

    fn vehicles() -> Vec<Vehicle> {
        vec![
            Vehicle::new("Pod", 2, 200, 2).unwrap(),
            Vehicle::new("Ship", 2, 600, 10).unwrap(),
        ]
    }

    fn pod() -> Vehicle {
        vehicles().remove(0)
    }

    fn ship() -> Vehicle {
        vehicles().remove(1)
    }

    fn select_all(store: &GameStore) -> Result<()> {
        let destinations = destinations();
        store.apply_selection(&destinations[0], &pod())?;
        store.apply_selection(&destinations[1], &pod())?;
        store.apply_selection(&destinations[2], &ship())?;
        store.apply_selection(&destinations[3], &ship())?;
        Ok(())
    }

    #[test]
    fn first_selection_updates_state() -> Result<()> {
        let Harness { store, .. } = harness(false);
        assert_eq!(store.snapshot().phase(), Phase::Idle);

        store.apply_selection(&Destination::new("Donlon", 100), &pod())?;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.state.selections().len(), 1);
        assert_eq!(snapshot.state.available_count("Pod"), 1);
        assert_eq!(snapshot.state.total_time(), 50);
        assert_eq!(snapshot.state.step(), 1);
        assert_eq!(snapshot.phase(), Phase::Selecting);
        assert!(snapshot.error.is_none());
        Ok(())
    }

    #[test]
    fn rejected_selection_only_sets_error() {
        let Harness { store, .. } = harness(false);
        let before = store.snapshot().state;

        let err = store
            .apply_selection(&Destination::new("Sapir", 400), &pod())
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Selection(SelectionError::RangeExceeded { .. })
        ));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.state, before);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Vehicle Pod cannot reach Sapir")
        );

        store.clear_error();
        let cleared = store.snapshot();
        assert!(cleared.error.is_none());
        assert_eq!(cleared.state, before);
    }

    #[tokio::test]
    async fn search_requires_complete_selection() -> Result<()> {
        let Harness { store, .. } = harness(false);
        store.apply_selection(&Destination::new("Donlon", 100), &pod())?;

        let err = store.search().await.unwrap_err();
        assert!(matches!(err, StoreError::IncompleteSelection));
        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Please select all 4 destinations")
        );
        assert_eq!(snapshot.state.selections().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn successful_search_is_stored() -> Result<()> {
        let Harness { store, .. } = harness(false);
        select_all(&store)?;
        assert_eq!(store.snapshot().phase(), Phase::Ready);

        let result = store.search().await?;
        assert_eq!(result, FindingResult::success("Donlon"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.phase(), Phase::Resolved);
        assert_eq!(
            snapshot.result.as_ref().map(|r| r.status),
            Some(FindingStatus::Success)
        );
        assert_eq!(snapshot.state.selections().len(), REQUIRED_SELECTIONS);
        assert_eq!(snapshot.state.total_time(), 50 + 100 + 30 + 40);
        Ok(())
    }

    #[tokio::test]
    async fn token_failure_preserves_selections() -> Result<()> {
        let Harness { store, tokens, .. } = harness(false);
        select_all(&store)?;
        let before = store.snapshot().state;
        tokens.fail.store(true, Ordering::SeqCst);

        let err = store.search().await.unwrap_err();
        assert!(matches!(err, StoreError::Workflow(WorkflowError::Token(_))));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.state, before);
        assert!(snapshot.result.is_none());
        assert!(!snapshot.searching);
        assert!(snapshot
            .error
            .as_deref()
            .is_some_and(|message| message.contains("token endpoint unreachable")));

        tokens.fail.store(false, Ordering::SeqCst);
        assert!(store.search().await?.is_success());
        Ok(())
    }

    #[tokio::test]
    async fn search_from_idle_is_incomplete() {
        let Harness { store, .. } = harness(false);
        assert_eq!(store.snapshot().phase(), Phase::Idle);

        let err = store.search().await.unwrap_err();
        assert!(matches!(err, StoreError::IncompleteSelection));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.phase(), Phase::Idle);
        assert!(snapshot.state.is_empty());
        assert!(!snapshot.searching);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Please select all 4 destinations")
        );
    }

    #[tokio::test]
    async fn not_found_is_resolved() -> Result<()> {
        let Harness {
            store, executor, ..
        } = harness(false);
        *executor.outcome.lock() = RawOutcome {
            destination_name: None,
            status: Some("false".to_string()),
            error: None,
        };
        select_all(&store)?;

        let result = store.search().await?;
        assert_eq!(result, FindingResult::not_found());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.phase(), Phase::Resolved);
        assert_eq!(snapshot.result, Some(FindingResult::not_found()));
        assert!(snapshot.error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn find_failure_preserves_selections() -> Result<()> {
        let Harness {
            store, executor, ..
        } = harness(false);
        select_all(&store)?;
        let before = store.snapshot().state;
        executor.fail.store(true, Ordering::SeqCst);

        let err = store.search().await.unwrap_err();
        assert!(matches!(err, StoreError::Workflow(WorkflowError::Find(_))));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.state, before);
        assert_eq!(snapshot.state.total_time(), 50 + 100 + 30 + 40);
        assert!(!snapshot.searching);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.phase(), Phase::Ready);
        assert!(snapshot
            .error
            .as_deref()
            .is_some_and(|message| message.contains("Token not initialized")));
        Ok(())
    }

    #[tokio::test]
    async fn clear_error_keeps_result() -> Result<()> {
        let Harness { store, .. } = harness(false);
        select_all(&store)?;
        store.search().await?;

        let err = store
            .apply_selection(&Destination::new("Donlon", 100), &ship())
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Selection(SelectionError::GameAlreadyComplete)
        ));
        assert!(store.snapshot().error.is_some());

        store.clear_error();
        let snapshot = store.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.result, Some(FindingResult::success("Donlon")));
        assert_eq!(snapshot.phase(), Phase::Resolved);
        Ok(())
    }

    #[tokio::test]
    async fn reset_restores_catalog_inventory() -> Result<()> {
        let Harness { store, .. } = harness(false);
        select_all(&store)?;
        store.search().await?;

        store.reset();
        let first = store.snapshot();
        store.reset();
        let second = store.snapshot();

        for snapshot in [&first, &second] {
            assert_eq!(snapshot.phase(), Phase::Idle);
            assert!(snapshot.state.is_empty());
            assert_eq!(snapshot.state.total_time(), 0);
            assert_eq!(snapshot.state.step(), 0);
            assert_eq!(snapshot.state.available_count("Pod"), 2);
            assert_eq!(snapshot.state.available_count("Ship"), 2);
            assert!(snapshot.result.is_none());
            assert!(snapshot.error.is_none());
        }
        assert_eq!(first.state, second.state);
        Ok(())
    }

    #[tokio::test]
    async fn reset_during_search_discards_response() -> Result<()> {
        let Harness {
            store, executor, ..
        } = harness(true);
        select_all(&store)?;

        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.search().await })
        };
        executor.started.notified().await;
        assert_eq!(store.snapshot().phase(), Phase::Searching);
        assert!(matches!(
            store.search().await,
            Err(StoreError::SearchInProgress)
        ));

        store.reset();
        executor.release.notify_one();

        let outcome = pending.await?;
        assert!(matches!(outcome, Err(StoreError::SearchSuperseded)));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.phase(), Phase::Idle);
        assert!(snapshot.result.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn subscribers_see_each_mutation() -> Result<()> {
        let Harness { store, .. } = harness(false);
        let mut updates = store.subscribe();
        updates.borrow_and_update();

        store.apply_selection(&Destination::new("Donlon", 100), &pod())?;
        updates.changed().await?;
        assert_eq!(updates.borrow_and_update().state.step(), 1);

        store.reset();
        updates.changed().await?;
        assert_eq!(updates.borrow_and_update().phase(), Phase::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn catalog_failure_is_fetch_error() {
        struct NoPlanets;

        #[async_trait]
        impl PlanetProvider for NoPlanets {
            async fn list(&self) -> Result<Vec<Destination>> {
                Err(anyhow!("Network error"))
            }
        }

        #[async_trait]
        impl VehicleProvider for NoPlanets {
            async fn list(&self) -> Result<Vec<Vehicle>> {
                Ok(Vec::new())
            }
        }

        let Harness { store, .. } = harness(false);
        let err = store.load(&NoPlanets, &NoPlanets).await.unwrap_err();
        assert!(matches!(err, StoreError::Fetch(_)));
        assert!(store
            .snapshot()
            .error
            .as_deref()
            .is_some_and(|message| message.contains("Network error")));
    }
}

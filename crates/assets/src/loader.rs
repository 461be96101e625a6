use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use seascape_common::Transform;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::import::{GltfImporter, LoadError, ModelData, ModelImporter};
use crate::placement::{MODEL_SCALE, PlacementBounds, random_position};

/// Identifies one `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

/// Shared flag telling in-flight loads to give up.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A load request with its position already resolved, so that retrying it
/// puts the model in the same spot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub asset_path: PathBuf,
    pub position: Vec3,
}

/// A successfully loaded model and where it goes.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Position from the request, uniform [`MODEL_SCALE`], no rotation.
    pub placement: Transform,
    pub model: ModelData,
}

/// Result of one `load` call.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub request: PlacementRequest,
    pub result: Result<LoadedModel, LoadError>,
}

/// Background model loader.
///
/// Each `load` runs on its own worker thread. Results come back in
/// completion order, unrelated to call order.
pub struct ModelLoader {
    importer: Arc<dyn ModelImporter>,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    cancel: CancelToken,
    rng: StdRng,
    bounds: PlacementBounds,
    next_ticket: u64,
    in_flight: usize,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader {
    /// A glTF loader with entropy-seeded random placement.
    pub fn new() -> Self {
        Self::with_importer(GltfImporter, StdRng::from_entropy())
    }

    pub fn with_importer(importer: impl ModelImporter, rng: StdRng) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            importer: Arc::new(importer),
            sender,
            receiver,
            cancel: CancelToken::new(),
            rng,
            bounds: PlacementBounds::default(),
            next_ticket: 0,
            in_flight: 0,
        }
    }

    pub fn with_bounds(mut self, bounds: PlacementBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Number of loads that have not been drained yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Abandon every in-flight and future load. Affected loads resolve to
    /// [`LoadError::Cancelled`].
    pub fn cancel_all(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(in_flight = self.in_flight, "cancelling model loads");
        }
        self.cancel.cancel();
    }

    /// Start loading `asset_path`. Without a position, one is drawn from
    /// the placement bounds.
    pub fn load(&mut self, asset_path: impl Into<PathBuf>, position: Option<Vec3>) -> LoadTicket {
        let position = position.unwrap_or_else(|| random_position(&mut self.rng, &self.bounds));
        self.submit(PlacementRequest {
            asset_path: asset_path.into(),
            position,
        })
    }

    /// Submit an earlier request again, e.g. after a failure.
    pub fn retry(&mut self, request: &PlacementRequest) -> LoadTicket {
        tracing::info!(path = %request.asset_path.display(), "retrying model load");
        self.submit(request.clone())
    }

    fn submit(&mut self, request: PlacementRequest) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight += 1;

        tracing::debug!(
            ticket = ticket.0,
            path = %request.asset_path.display(),
            position = ?request.position,
            "model load queued"
        );

        let importer = self.importer.clone();
        let cancel = self.cancel.clone();
        let sender = self.sender.clone();
        let worker_request = request.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("model-load-{}", ticket.0))
            .spawn(move || {
                let result = run_load(importer.as_ref(), &cancel, &worker_request);
                // The loader may already be gone; nobody is left to care.
                let _ = sender.send(LoadOutcome {
                    ticket,
                    request: worker_request,
                    result,
                });
            });

        if let Err(e) = spawned {
            let _ = self.sender.send(LoadOutcome {
                ticket,
                request,
                result: Err(LoadError::Io(e)),
            });
        }

        ticket
    }

    /// Drain every finished load without blocking.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut done = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            self.finish(&outcome);
            done.push(outcome);
        }
        done
    }

    /// Block until one load finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => {
                self.finish(&outcome);
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    fn finish(&mut self, outcome: &LoadOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match &outcome.result {
            Ok(loaded) => tracing::info!(
                ticket = outcome.ticket.0,
                model = %loaded.model.name,
                meshes = loaded.model.meshes.len(),
                "model loaded"
            ),
            Err(LoadError::Cancelled) => {
                tracing::debug!(ticket = outcome.ticket.0, "model load cancelled")
            }
            Err(e) => tracing::warn!(
                ticket = outcome.ticket.0,
                path = %outcome.request.asset_path.display(),
                "model load failed: {e}"
            ),
        }
    }
}

fn run_load(
    importer: &dyn ModelImporter,
    cancel: &CancelToken,
    request: &PlacementRequest,
) -> Result<LoadedModel, LoadError> {
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled);
    }
    let model = importer.import(&request.asset_path)?;
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled);
    }
    Ok(LoadedModel {
        placement: Transform {
            position: request.position,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(MODEL_SCALE),
        },
        model,
    })
}

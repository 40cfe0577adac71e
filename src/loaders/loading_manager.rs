//! Loading manager tracking the asset slots.

use super::{AssetKind, AssetPayload, LoadError, LoadState};
use crossbeam_channel::{Receiver, Sender};

/// Result of one load, as delivered over the completion channel.
#[derive(Debug)]
pub struct AssetCompletion {
    /// Which slot the load belongs to.
    pub kind: AssetKind,
    /// Decoded payload or the reason it is missing.
    pub result: Result<AssetPayload, LoadError>,
}

/// One-shot handle for reporting a load.
///
/// Dropping it without calling [`CompletionSender::complete`] reports
/// [`LoadError::Cancelled`], so a slot never stays in `Loading` because a
/// worker died.
#[derive(Debug)]
pub struct CompletionSender {
    kind: AssetKind,
    sender: Option<Sender<AssetCompletion>>,
}

impl CompletionSender {
    /// Asset slot this sender reports for.
    #[inline]
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Decode raw bytes (or forward the read error) and report the result.
    pub fn complete(mut self, bytes: Result<Vec<u8>, LoadError>) {
        let result = bytes.and_then(|bytes| self.kind.decode(&bytes));
        self.send(result);
    }

    fn send(&mut self, result: Result<AssetPayload, LoadError>) {
        if let Some(sender) = self.sender.take() {
            // the manager may already be gone during teardown
            let _ = sender.send(AssetCompletion { kind: self.kind, result });
        }
    }
}

impl Drop for CompletionSender {
    fn drop(&mut self) {
        self.send(Err(LoadError::Cancelled));
    }
}

/// Owns the per-asset state machine and the receiving end of the
/// completion channel.
pub struct LoadingManager {
    /// Slot state, indexed by [`AssetKind::index`].
    states: [LoadState; AssetKind::COUNT],
    sender: Sender<AssetCompletion>,
    receiver: Receiver<AssetCompletion>,
}

impl LoadingManager {
    /// Create a new loading manager with every slot idle.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            states: [LoadState::Idle; AssetKind::COUNT],
            sender,
            receiver,
        }
    }

    /// State of one slot.
    #[inline]
    pub fn state(&self, kind: AssetKind) -> LoadState {
        self.states[kind.index()]
    }

    /// Start a load. Returns `None` if the slot is not idle; every asset is
    /// requested at most once.
    pub fn begin(&mut self, kind: AssetKind) -> Option<CompletionSender> {
        let state = &mut self.states[kind.index()];
        if *state != LoadState::Idle {
            log::debug!("{} already requested ({:?})", kind, state);
            return None;
        }
        *state = LoadState::Loading;
        Some(CompletionSender {
            kind,
            sender: Some(self.sender.clone()),
        })
    }

    /// Read and decode a file on a worker thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(&mut self, kind: AssetKind, path: impl Into<std::path::PathBuf>) {
        let Some(completion) = self.begin(kind) else { return };
        let path = path.into();
        let spawned = std::thread::Builder::new()
            .name(format!("load {}", kind))
            .spawn(move || {
                let bytes = std::fs::read(&path).map_err(LoadError::from);
                completion.complete(bytes);
            });
        // a failed spawn drops the closure, which reports the slot as cancelled
        if let Err(e) = spawned {
            log::warn!("could not start loader thread for {}: {}", kind, e);
        }
    }

    /// Hand over bytes fetched by the host, decoding them immediately.
    pub fn provide(&mut self, kind: AssetKind, bytes: Vec<u8>) {
        if let Some(completion) = self.begin(kind) {
            completion.complete(Ok(bytes));
        }
    }

    /// Report that the host could not fetch an asset.
    pub fn fail(&mut self, kind: AssetKind, error: LoadError) {
        if let Some(completion) = self.begin(kind) {
            completion.complete(Err(error));
        }
    }

    /// Drain finished loads, updating slot states. Failures are logged and
    /// dropped; only successful payloads are returned.
    pub fn poll(&mut self) -> Vec<(AssetKind, AssetPayload)> {
        let mut ready = Vec::new();
        for AssetCompletion { kind, result } in self.receiver.try_iter() {
            let state = &mut self.states[kind.index()];
            if *state != LoadState::Loading {
                continue;
            }
            match result {
                Ok(payload) => {
                    log::info!("loaded {}", kind);
                    *state = LoadState::Loaded;
                    ready.push((kind, payload));
                }
                Err(e) => {
                    log::warn!("failed to load {}, keeping default: {}", kind, e);
                    *state = LoadState::Failed;
                }
            }
        }
        ready
    }

    /// Number of slots still loading.
    pub fn pending(&self) -> usize {
        self.states.iter().filter(|s| **s == LoadState::Loading).count()
    }

    /// Get progress as a fraction of requested slots that settled (0.0 - 1.0).
    pub fn fraction(&self) -> f32 {
        let requested = self.states.iter().filter(|s| **s != LoadState::Idle).count();
        if requested == 0 {
            1.0
        } else {
            (requested - self.pending()) as f32 / requested as f32
        }
    }
}

impl Default for LoadingManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Background asset decoding.
//!
//! File reads and decoding (HDR, PNG, glTF) run on a dedicated thread. The
//! frame loop submits requests and drains finished assets once per frame;
//! nothing on the worker touches GPU or render state.

use std::path::PathBuf;
use std::sync::mpsc;

use super::images::{BackgroundImage, EnvironmentMap};
use super::model::Model;
use crate::error::VitrineError;

/// Which slot of the scene an asset fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Equirectangular HDR environment.
    Environment,
    /// Flat background image.
    Background,
    /// glTF model.
    Model,
}

/// A decoded asset.
#[derive(Debug)]
pub enum AssetPayload {
    /// See [`AssetKind::Environment`].
    Environment(EnvironmentMap),
    /// See [`AssetKind::Background`].
    Background(BackgroundImage),
    /// See [`AssetKind::Model`].
    Model(Model),
}

/// A finished load.
#[derive(Debug)]
pub struct AssetEvent {
    /// Requested kind.
    pub kind: AssetKind,
    /// Requested path.
    pub path: PathBuf,
    /// Decoded asset or the failure.
    pub result: Result<AssetPayload, VitrineError>,
}

enum AssetRequest {
    Load { kind: AssetKind, path: PathBuf },
    Shutdown,
}

/// Owns the asset thread.
pub struct AssetWorker {
    request_tx: mpsc::Sender<AssetRequest>,
    result_rx: mpsc::Receiver<AssetEvent>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl AssetWorker {
    /// Spawn the asset thread.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::ThreadSpawn`] if the thread cannot start.
    pub fn new() -> Result<Self, VitrineError> {
        let (request_tx, request_rx) = mpsc::channel::<AssetRequest>();
        let (result_tx, result_rx) = mpsc::channel::<AssetEvent>();

        let thread = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                Self::thread_loop(&request_rx, &result_tx);
            })
            .map_err(VitrineError::ThreadSpawn)?;

        Ok(Self {
            request_tx,
            result_rx,
            thread: Some(thread),
        })
    }

    /// Queue a load (non-blocking).
    pub fn submit(&self, kind: AssetKind, path: PathBuf) {
        log::debug!("loading {kind:?} from {}", path.display());
        let _ = self.request_tx.send(AssetRequest::Load { kind, path });
    }

    /// Next finished load, if any (non-blocking).
    pub fn poll(&self) -> Option<AssetEvent> {
        self.result_rx.try_recv().ok()
    }

    /// Shut down the asset thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(AssetRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn thread_loop(
        request_rx: &mpsc::Receiver<AssetRequest>,
        result_tx: &mpsc::Sender<AssetEvent>,
    ) {
        while let Ok(request) = request_rx.recv() {
            let (kind, path) = match request {
                AssetRequest::Load { kind, path } => (kind, path),
                AssetRequest::Shutdown => break,
            };
            let result = decode(kind, &path);
            if result_tx.send(AssetEvent { kind, path, result }).is_err() {
                break;
            }
        }
    }
}

impl Drop for AssetWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Blocking load of one asset.
///
/// # Errors
///
/// Returns [`VitrineError::AssetLoad`] if reading or decoding fails.
pub fn decode(
    kind: AssetKind,
    path: &std::path::Path,
) -> Result<AssetPayload, VitrineError> {
    match kind {
        AssetKind::Environment => {
            EnvironmentMap::load(path).map(AssetPayload::Environment)
        }
        AssetKind::Background => {
            BackgroundImage::load(path).map(AssetPayload::Background)
        }
        AssetKind::Model => Model::load(path).map(AssetPayload::Model),
    }
}

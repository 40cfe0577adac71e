//! Asset loading.
//!
//! Loads run out-of-band (a worker thread natively, the browser on the web)
//! and report over a channel. The frame loop drains the channel once per
//! frame, so a completion can never land halfway through a frame.

mod asset;
mod loading_manager;
mod obj_loader;

pub use asset::{AssetKind, AssetPayload};
pub use loading_manager::{AssetCompletion, CompletionSender, LoadingManager};
pub use obj_loader::{ObjLoader, ObjObject};

use thiserror::Error;

/// Loading state of one asset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Not started.
    #[default]
    Idle,
    /// Currently loading.
    Loading,
    /// Successfully loaded.
    Loaded,
    /// Failed to load. Permanent; the feature keeps its default look.
    Failed,
}

/// Asset loading errors.
#[derive(Error, Debug)]
pub enum LoadError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The bytes were readable but not usable.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The loader went away without reporting a result.
    #[error("Load cancelled")]
    Cancelled,
}

//! # Project
//!
//! The set of layers a session works on. [`Project`] is generic over the
//! layer type so the same commands run against [`MemLayer`] in tests and
//! [`FileLayer`] in the CLI.
//!
//! A file-backed project is a directory: every `*.layer.json` document in it
//! is one layer. Documents that fail to parse are skipped with a warning.
//!
//! [`MemLayer`]: crate::layer::memory::MemLayer

use crate::error::{FvtError, Result};
use crate::layer::fs::{FileLayer, LAYER_SUFFIX};
use crate::layer::VectorLayer;
use std::fs;
use std::path::Path;
use tracing::warn;

pub struct Project<L: VectorLayer> {
    layers: Vec<L>,
}

impl<L: VectorLayer> Default for Project<L> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<L: VectorLayer> Project<L> {
    pub fn new(layers: Vec<L>) -> Self {
        Self { layers }
    }

    pub fn add_layer(&mut self, layer: L) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[L] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut L> {
        self.layers.iter_mut()
    }

    pub fn layer(&self, id: &str) -> Result<&L> {
        self.layers
            .iter()
            .find(|l| l.id() == id)
            .ok_or_else(|| FvtError::LayerNotFound(id.to_string()))
    }

    pub fn layer_mut(&mut self, id: &str) -> Result<&mut L> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| FvtError::LayerNotFound(id.to_string()))
    }
}

impl Project<FileLayer> {
    /// Load every layer document in `dir`, ordered by file name.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_layer = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(LAYER_SUFFIX));
            if path.is_file() && is_layer {
                paths.push(path);
            }
        }
        paths.sort();

        let mut project = Self::default();
        for path in paths {
            match FileLayer::open(&path) {
                Ok(layer) => {
                    if project.layers.iter().any(|l| l.id() == layer.id()) {
                        warn!(path = %path.display(), id = layer.id(), "duplicate layer id, skipping");
                        continue;
                    }
                    project.add_layer(layer);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable layer"),
            }
        }
        Ok(project)
    }
}

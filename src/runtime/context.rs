use std::sync::{Arc, Mutex, MutexGuard};

use crate::acquire::AcquisitionPipeline;
use crate::library::LoftyMetadata;
use crate::player::PlaybackEngine;

/// Everything the command loop and the poll thread share, built once at startup.
pub struct AppContext {
    engine: Arc<Mutex<PlaybackEngine>>,
    pub pipeline: AcquisitionPipeline,
    pub metadata: LoftyMetadata,
}

impl AppContext {
    pub fn new(engine: PlaybackEngine, pipeline: AcquisitionPipeline) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            pipeline,
            metadata: LoftyMetadata,
        }
    }

    /// Lock the engine, recovering from a poisoned lock.
    pub fn engine(&self) -> MutexGuard<'_, PlaybackEngine> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn engine_handle(&self) -> Arc<Mutex<PlaybackEngine>> {
        Arc::clone(&self.engine)
    }
}

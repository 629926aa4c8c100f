use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::acquire::AcquisitionPipeline;
use crate::library::LibraryStore;
use crate::player::{PlaybackEngine, RodioBackend};

mod commands;
mod context;
mod event_loop;
mod logging;
mod output;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

use context::AppContext;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.logging);

    let store = LibraryStore::from_settings(&settings.library);
    store.ensure_dirs()?;

    let backend = RodioBackend::spawn()?;
    let mut engine = PlaybackEngine::new(store, Box::new(backend));
    startup::apply_playback_defaults(&mut engine, &settings.playback);

    let pipeline = AcquisitionPipeline::from_settings(&settings)?;
    let ctx = AppContext::new(engine, pipeline);

    let shutdown = Arc::new(AtomicBool::new(false));
    let poller = event_loop::spawn_poller(
        ctx.engine_handle(),
        Arc::clone(&shutdown),
        Duration::from_millis(settings.playback.poll_interval_ms),
    )?;

    output::info("Type 'help' for available commands.");
    let run_result = event_loop::run(&ctx, io::stdin().lock());

    shutdown.store(true, Ordering::Release);
    let _ = poller.join();

    run_result
}

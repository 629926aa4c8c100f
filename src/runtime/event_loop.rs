use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::player::PlaybackEngine;

use super::commands::{Command, Flow, execute};
use super::context::AppContext;
use super::output;

/// Spawn the thread that auto-advances when a track ends.
///
/// Each tick takes the engine lock, so an auto-advance never interleaves with
/// a user command.
pub fn spawn_poller(
    engine: Arc<Mutex<PlaybackEngine>>,
    shutdown: Arc<AtomicBool>,
    interval: Duration,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("playback-poll".to_string())
        .spawn(move || {
            while !shutdown.load(Ordering::Acquire) {
                thread::sleep(interval);
                let outcome = engine
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .poll_finished();
                if let Some(Err(e)) = outcome {
                    output::error(e);
                }
            }
        })
}

/// Read commands line by line until `quit` or end of input.
pub fn run(ctx: &AppContext, input: impl BufRead) -> Result<(), Box<dyn std::error::Error>> {
    output::prompt();
    for line in input.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let flow = match Command::parse(&line) {
                Ok(cmd) => execute(ctx, cmd),
                Err(e) => {
                    output::error(e);
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                return Ok(());
            }
        }
        output::prompt();
    }
    Ok(())
}

//! `AudioBackend` backed by rodio.
//!
//! The output stream lives on a dedicated audio thread; the engine talks to
//! it over a channel. The thread also notices when the sink drains and raises
//! the finished flag exactly once per track.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::error::PlaybackError;

use super::backend::AudioBackend;

/// How often the audio thread checks whether the current sink has drained.
const DRAIN_CHECK: Duration = Duration::from_millis(50);

enum BackendCmd {
    Load(PathBuf, Sender<Result<(), String>>),
    Play,
    Pause,
    SetVolume(f32),
    Quit,
}

pub struct RodioBackend {
    tx: Sender<BackendCmd>,
    finished: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl RodioBackend {
    /// Open the default output device on a new audio thread.
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (tx, rx) = mpsc::channel::<BackendCmd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let finished = Arc::new(AtomicBool::new(false));

        let finished_for_thread = finished.clone();
        let join = thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || match OutputStreamBuilder::open_default_stream() {
                Ok(mut stream) => {
                    // rodio logs to stderr when the stream is dropped; noisy in a CLI.
                    stream.log_on_drop(false);
                    let _ = ready_tx.send(Ok(()));
                    run_audio_thread(&stream, rx, &finished_for_thread);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                finished,
                join: Some(join),
            }),
            Ok(Err(reason)) => {
                let _ = join.join();
                Err(PlaybackError::Device(reason))
            }
            Err(_) => Err(PlaybackError::Device("audio thread exited".to_string())),
        }
    }

    fn send(&self, cmd: BackendCmd) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!("audio thread is gone; command dropped");
        }
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(BackendCmd::Load(path.to_path_buf(), reply_tx));

        let reason = match reply_rx.recv() {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(reason)) => reason,
            Err(_) => "audio thread exited".to_string(),
        };
        Err(PlaybackError::Load {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn play(&mut self) {
        self.send(BackendCmd::Play);
    }

    fn pause(&mut self) {
        self.send(BackendCmd::Pause);
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(BackendCmd::SetVolume(volume));
    }

    fn take_finished(&mut self) -> bool {
        self.finished.swap(false, Ordering::AcqRel)
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        let _ = self.tx.send(BackendCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

/// Create a paused `Sink` for the file at `path`.
fn create_sink(stream: &OutputStream, path: &Path) -> Result<Sink, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let source = Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

fn run_audio_thread(stream: &OutputStream, rx: Receiver<BackendCmd>, finished: &AtomicBool) {
    let mut sink: Option<Sink> = None;
    let mut paused = true;
    let mut volume = 1.0f32;

    loop {
        match rx.recv_timeout(DRAIN_CHECK) {
            Ok(BackendCmd::Load(path, reply)) => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                // A track replaced before it ended never reports as finished.
                finished.store(false, Ordering::Release);
                paused = true;

                let result = create_sink(stream, &path).map(|new_sink| {
                    new_sink.set_volume(volume);
                    sink = Some(new_sink);
                });
                if let Err(reason) = &result {
                    tracing::warn!(path = %path.display(), %reason, "cannot open track");
                }
                let _ = reply.send(result);
            }
            Ok(BackendCmd::Play) => {
                if let Some(s) = &sink {
                    s.play();
                    paused = false;
                }
            }
            Ok(BackendCmd::Pause) => {
                if let Some(s) = &sink {
                    s.pause();
                    paused = true;
                }
            }
            Ok(BackendCmd::SetVolume(v)) => {
                volume = v.clamp(0.0, 1.0);
                if let Some(s) = &sink {
                    s.set_volume(volume);
                }
            }
            Ok(BackendCmd::Quit) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(s) = sink.take() {
                    s.stop();
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if !paused && sink.as_ref().is_some_and(Sink::empty) {
                    sink = None;
                    paused = true;
                    finished.store(true, Ordering::Release);
                }
            }
        }
    }
}

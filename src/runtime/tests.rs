use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use super::commands::{Command, Flow, execute};
use super::context::AppContext;
use super::{event_loop, startup};
use crate::acquire::{AcquisitionPipeline, Fetcher, Locator, Resolver};
use crate::config::PlaybackSettings;
use crate::error::{AcquireError, CommandError, PlaybackError};
use crate::library::LibraryStore;
use crate::player::{AudioBackend, PlaybackEngine};

#[derive(Default)]
struct Calls {
    loaded: Vec<PathBuf>,
    volume: Option<f32>,
    finished: bool,
}

#[derive(Clone, Default)]
struct StubBackend(Arc<Mutex<Calls>>);

impl AudioBackend for StubBackend {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.0.lock().unwrap().loaded.push(path.to_path_buf());
        Ok(())
    }
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn set_volume(&mut self, volume: f32) {
        self.0.lock().unwrap().volume = Some(volume);
    }
    fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.0.lock().unwrap().finished)
    }
}

struct EchoResolver;

impl Resolver for EchoResolver {
    fn resolve(&self, query: &str) -> Result<Locator, AcquireError> {
        Ok(Locator::new(query))
    }
}

struct TitleFetcher;

impl Fetcher for TitleFetcher {
    fn fetch(&self, locator: &Locator, dest_dir: &Path) -> Result<PathBuf, AcquireError> {
        let path = dest_dir.join(format!("{}.mp3", locator.as_str()));
        fs::write(&path, b"x")?;
        Ok(path)
    }
}

fn context(titles: &[&str]) -> (TempDir, AppContext, StubBackend) {
    let dir = TempDir::new().unwrap();
    let store = LibraryStore::new(dir.path().join("songs"), dir.path().join("temp"), "mp3");
    store.ensure_dirs().unwrap();
    for t in titles {
        fs::write(store.track_path(t), b"x").unwrap();
    }

    let backend = StubBackend::default();
    let engine = PlaybackEngine::new(store.clone(), Box::new(backend.clone()));
    let pipeline =
        AcquisitionPipeline::new(store, Arc::new(EchoResolver), Arc::new(TitleFetcher), 2);
    (dir, AppContext::new(engine, pipeline), backend)
}

#[test]
fn parse_simple_commands() {
    assert_eq!(Command::parse("help"), Ok(Command::Help));
    assert_eq!(Command::parse("  LIST "), Ok(Command::List));
    assert_eq!(Command::parse("Next"), Ok(Command::Next));
    assert_eq!(Command::parse("previous"), Ok(Command::Previous));
    assert_eq!(Command::parse("exit"), Ok(Command::Quit));
    assert_eq!(Command::parse("quit"), Ok(Command::Quit));
}

#[test]
fn parse_arguments() {
    assert_eq!(
        Command::parse("search  Bohemian Rhapsody "),
        Ok(Command::Search("Bohemian Rhapsody".to_string()))
    );
    assert_eq!(Command::parse("select 3"), Ok(Command::Select(2)));
    assert_eq!(Command::parse("volume 150"), Ok(Command::Volume(150)));
    assert_eq!(Command::parse("volume -4"), Ok(Command::Volume(-4)));
    assert_eq!(
        Command::parse("batch Lists/Road Trip.txt"),
        Ok(Command::Batch(PathBuf::from("Lists/Road Trip.txt")))
    );
}

#[test]
fn parse_errors() {
    assert_eq!(
        Command::parse("dance"),
        Err(CommandError::Unknown("dance".to_string()))
    );
    assert_eq!(
        Command::parse("search"),
        Err(CommandError::MissingArgument("search"))
    );
    assert_eq!(
        Command::parse("select two"),
        Err(CommandError::InvalidNumber("two".to_string()))
    );
    assert_eq!(
        Command::parse("select 0"),
        Err(CommandError::InvalidNumber("0".to_string()))
    );
    assert_eq!(
        Command::parse("volume"),
        Err(CommandError::MissingArgument("volume"))
    );
}

#[test]
fn execute_select_plays_track() {
    let (_dir, ctx, backend) = context(&["Alpha", "Bravo"]);

    assert_eq!(execute(&ctx, Command::Select(1)), Flow::Continue);

    let state = ctx.engine().state();
    assert_eq!(state.current_index, 1);
    assert!(state.is_playing);
    assert_eq!(backend.0.lock().unwrap().loaded.len(), 1);
}

#[test]
fn execute_search_refreshes_playlist() {
    let (_dir, ctx, _) = context(&["Alpha"]);

    execute(&ctx, Command::Search("Zulu Song".to_string()));

    assert_eq!(ctx.engine().playlist(), ["Alpha", "ZuluSong"]);
}

#[test]
fn execute_batch_file() {
    let (dir, ctx, _) = context(&[]);
    let list = dir.path().join("list.txt");
    fs::write(&list, "[One, Two, One]").unwrap();

    execute(&ctx, Command::Batch(list));

    assert_eq!(ctx.engine().playlist(), ["One", "Two"]);
}

#[test]
fn execute_bad_volume_keeps_backend_volume() {
    let (_dir, ctx, backend) = context(&["Alpha"]);
    execute(&ctx, Command::Volume(150));
    assert_eq!(backend.0.lock().unwrap().volume, None);
    execute(&ctx, Command::Volume(30));
    assert_eq!(backend.0.lock().unwrap().volume, Some(0.3));
}

#[test]
fn parse_volume_saturates_huge_levels() {
    assert_eq!(
        Command::parse("volume 99999999999999999999"),
        Ok(Command::Volume(i64::MAX))
    );
    assert_eq!(
        Command::parse("volume -99999999999999999999"),
        Ok(Command::Volume(i64::MIN))
    );
    assert_eq!(
        Command::parse("volume loud"),
        Err(CommandError::InvalidNumber("loud".to_string()))
    );
}

#[test]
fn execute_huge_volume_is_out_of_range() {
    let (_dir, ctx, backend) = context(&["Alpha"]);
    let cmd = Command::parse("volume 99999999999999999999").unwrap();
    execute(&ctx, cmd);
    assert_eq!(backend.0.lock().unwrap().volume, None);
    assert!(matches!(
        ctx.engine().set_volume(i64::MAX),
        Err(PlaybackError::OutOfRange(i64::MAX))
    ));
    assert_eq!(ctx.engine().volume(), 100);
}

#[test]
fn execute_quit() {
    let (_dir, ctx, _) = context(&[]);
    assert_eq!(execute(&ctx, Command::Quit), Flow::Quit);
}

#[test]
fn input_loop_stops_at_quit() {
    let (_dir, ctx, _) = context(&["Alpha", "Bravo"]);
    let input = Cursor::new("\nbogus\nselect 2\nquit\nselect 1\n");

    event_loop::run(&ctx, input).unwrap();

    assert_eq!(ctx.engine().state().current_index, 1);
}

#[test]
fn poller_auto_advances() {
    let (_dir, ctx, backend) = context(&["Alpha", "Bravo"]);
    ctx.engine().play().unwrap();
    backend.0.lock().unwrap().finished = true;

    let shutdown = Arc::new(AtomicBool::new(false));
    let handle = event_loop::spawn_poller(
        ctx.engine_handle(),
        Arc::clone(&shutdown),
        Duration::from_millis(5),
    )
    .unwrap();

    let mut advanced = false;
    for _ in 0..200 {
        if ctx.engine().state().current_index == 1 {
            advanced = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    shutdown.store(true, Ordering::Release);
    handle.join().unwrap();

    assert!(advanced);
    assert_eq!(backend.0.lock().unwrap().loaded.len(), 2);
}

#[test]
fn startup_applies_volume_and_shuffle() {
    let (_dir, ctx, backend) = context(&["Alpha", "Bravo"]);
    let settings = PlaybackSettings {
        volume: 55,
        shuffle: true,
        ..PlaybackSettings::default()
    };

    startup::apply_playback_defaults(&mut ctx.engine(), &settings);

    assert_eq!(backend.0.lock().unwrap().volume, Some(0.55));
    assert!(ctx.engine().state().is_shuffling);
}

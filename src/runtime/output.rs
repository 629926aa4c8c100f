//! Colored console output for the command loop.
//!
//! Blue for information, yellow for track titles, red for errors and green
//! for help keys.

use std::fmt::Display;
use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::acquire::AcquireObserver;
use crate::error::AcquireError;
use crate::library::Track;

pub fn info(msg: impl Display) {
    println!("{}", msg.to_string().blue());
}

pub fn error(msg: impl Display) {
    println!("{}", format!("Error: {msg}").red());
}

/// `label` in blue followed by a yellow title, e.g. `Now Playing 3 : Title`.
pub fn titled(label: impl Display, title: &str) {
    println!("{} {}", label.to_string().blue(), title.yellow());
}

pub fn prompt() {
    print!("{}", "Enter a command: ".blue());
    let _ = io::stdout().flush();
}

pub fn help() {
    const COMMANDS: &[(&str, &str)] = &[
        ("help", "Return a list of available commands"),
        ("search <query>", "Search and download a song"),
        ("select <index>", "Select a song from the list"),
        ("list", "List all available songs"),
        ("shuffle", "Toggle shuffle mode"),
        ("play", "Resume playing the paused song"),
        ("pause", "Pause the currently playing song"),
        ("next", "Play the next song in the playlist"),
        ("previous", "Play the previous song in the playlist"),
        ("current", "Return the name of the current song"),
        ("volume <level>", "Set volume level (0 to 100)"),
        ("batch <path>", "Add songs from a text file"),
        ("quit", "Stop playback and exit"),
    ];

    info("Available commands:");
    for (key, what) in COMMANDS {
        println!("  {} {what}", format!("{key}:").green());
    }
}

/// Reports download progress on the console.
pub struct ConsoleObserver;

impl AcquireObserver for ConsoleObserver {
    fn job_started(&self, job_id: usize, query: &str) {
        titled(format!("Creating download job #{job_id} :"), query);
    }

    fn job_failed(&self, query: &str, err: &AcquireError) {
        error(format!("{query}: {err}"));
    }

    fn promoted(&self, count: usize, track: &Track) {
        titled(format!("Downloaded {count} :"), &track.title);
    }
}

//! Terminal presentation: parsing typed commands and printing screens.

pub mod input;
pub mod labels;
pub mod render;

use std::io::{BufRead, Write};

use crate::app::BackendEvent;

/// Print rendered output and flush, so prompts appear before the next read.
pub fn print(text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

/// A message the user has to see, such as a microphone failure.
pub fn alert(message: &str) {
    eprintln!("[!] {message}");
}

pub fn notice(message: &str) {
    println!("({message})");
}

pub fn help() {
    println!("{}", input::HELP);
}

/// Read stdin lines on a dedicated OS thread and forward them to the loop.
/// A blocked read never holds up shutdown.
pub fn start_input_listener(sender: async_channel::Sender<BackendEvent>) {
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send_blocking(BackendEvent::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to read input: {e}");
                        break;
                    }
                }
            }
            let _ = sender.send_blocking(BackendEvent::InputClosed);
        });
    if let Err(e) = spawned {
        log::error!("Failed to spawn input thread: {e}");
    }
}

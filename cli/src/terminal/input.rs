use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use netrecon_core::signal::StopSignal;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Raises a [`StopSignal`] when the user presses 'q' or Ctrl-C.
///
/// Raw mode is only entered on an interactive terminal. Elsewhere a plain
/// Ctrl-C handler covers the same job.
pub struct InputHandle {
    done: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    ctrl_c: Option<tokio::task::JoinHandle<()>>,
}

impl InputHandle {
    pub fn start(stop: StopSignal) -> Self {
        let done = Arc::new(AtomicBool::new(false));

        let ctrl_c = {
            let stop = stop.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, finishing with what was found so far");
                    stop.stop();
                }
            })
        };

        let worker = if std::io::stdin().is_terminal() {
            let done = done.clone();
            Some(thread::spawn(move || listen_for_keys(stop, done)))
        } else {
            None
        };

        Self {
            done,
            worker,
            ctrl_c: Some(ctrl_c),
        }
    }
}

fn listen_for_keys(stop: StopSignal, done: Arc<AtomicBool>) {
    if let Err(e) = enable_raw_mode() {
        debug!("Key listener disabled, raw mode unavailable: {e}");
        return;
    }

    while !done.load(Ordering::Relaxed) && !stop.is_stopped() {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }

        if let Ok(Event::Key(key_event)) = event::read() {
            if is_interrupt(&key_event) {
                warn!("Stop requested, finishing with what was found so far");
                stop.stop();
                break;
            }
        }
    }

    let _ = disable_raw_mode();
}

fn is_interrupt(key_event: &KeyEvent) -> bool {
    let is_q = key_event.code == KeyCode::Char('q');
    let is_ctrl_c = key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL);
    (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if let Some(ctrl_c) = self.ctrl_c.take() {
            ctrl_c.abort();
        }
        let _ = disable_raw_mode();
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_and_ctrl_c_interrupt() {
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(is_interrupt(&q));
        assert!(is_interrupt(&ctrl_c));
    }

    #[test]
    fn other_keys_are_ignored() {
        let c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(!is_interrupt(&c));
        assert!(!is_interrupt(&enter));
    }
}

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TIP_DURATION: Duration = Duration::from_secs(1);
const MESSAGE_READ_TIME: Duration = Duration::from_secs(1);
const MIN_TIP_VISIBILITY: Duration = Duration::from_millis(750);
const TIPS: &[&str] = &[
    "You can press 'q' to finish early",
    "Use --deadline to cap the run time",
];

/// Spinner bound to a tracing span, with a message queue that rotates tips
/// while no fresh progress arrives.
pub struct SpinnerHandle {
    span: Span,
    tx: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl SpinnerHandle {
    pub fn start(span: Span) -> Self {
        let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[
                "▁▁▁▁▁",
                "▁▂▂▂▁",
                "▁▄▂▄▁",
                "▂▄▆▄▂",
                "▄▆█▆▄",
                "▂▄▆▄▂",
                "▁▄▂▄▁",
                "▁▂▂▂▁",
            ]);
        span.pb_set_style(&style);
        span.pb_start();

        let (tx, rx) = mpsc::channel::<String>();
        let span_clone = span.clone();

        let worker = thread::spawn(move || {
            let mut tip_index = 0;
            let mut next_action_time = Instant::now() + TIP_DURATION;
            let mut is_showing_tip = false;
            let mut last_tip_time = Instant::now();

            loop {
                let wait_time = next_action_time.saturating_duration_since(Instant::now());

                match rx.recv_timeout(wait_time) {
                    Ok(mut msg) => {
                        if is_showing_tip {
                            let elapsed = last_tip_time.elapsed();
                            if elapsed < MIN_TIP_VISIBILITY {
                                thread::sleep(MIN_TIP_VISIBILITY - elapsed);
                            }
                            is_showing_tip = false;
                        }
                        while let Ok(newer_msg) = rx.try_recv() {
                            msg = newer_msg;
                        }
                        span_clone.pb_set_message(&msg);
                        next_action_time = Instant::now() + MESSAGE_READ_TIME;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        let tip = TIPS[tip_index % TIPS.len()];
                        span_clone.pb_set_message(&format!("{}", tip.italic().white()));

                        tip_index += 1;
                        is_showing_tip = true;
                        last_tip_time = Instant::now();

                        next_action_time = Instant::now() + TIP_DURATION;
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        break;
                    }
                }
            }
        });

        Self {
            span,
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    pub fn send_to_queue(&self, message: String) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(message);
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Stops the tip rotation. The bar itself goes away with its span.
    pub fn finish(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

pub fn hosts_found_message(count: usize) -> String {
    format!(
        "Identified {} so far...",
        format!("{count} live hosts").green().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}

pub fn scanning_message(address: &str, index: usize, total: usize) -> String {
    format!(
        "Scanning {} ({}/{})",
        address.color(colors::ACCENT).bold(),
        index + 1,
        total
    )
}

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use indicatif::{ProgressBar, ProgressStyle};

use super::aggregate::ScanStats;

/// Interval between redraws of the progress line.
const TICK: Duration = Duration::from_millis(100);

/// Elapsed-time progress line drawn to stderr while a scan runs.
///
/// A dedicated thread redraws the spinner every 100ms until `finish` (or
/// drop) signals the done channel, so the last line never outlives the
/// scan. When disabled, or when stderr is not a terminal, nothing is
/// drawn but the lifecycle is identical.
pub struct ProgressReporter {
    done: Sender<()>,
    thread: Option<JoinHandle<()>>,
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn start(stats: Arc<ScanStats>, enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} scanning {msg} [{elapsed}]")
                .expect("static progress template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );

        let (done, done_rx) = bounded::<()>(1);
        let ticker = bar.clone();
        let thread = thread::Builder::new()
            .name("hogs-progress".to_string())
            .spawn(move || loop {
                match done_rx.recv_timeout(TICK) {
                    Err(RecvTimeoutError::Timeout) => {
                        ticker.set_message(format!(
                            "{} files, {} dirs",
                            stats.files(),
                            stats.dirs()
                        ));
                        ticker.tick();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .expect("failed to spawn progress thread");

        Self {
            done,
            thread: Some(thread),
            bar,
        }
    }

    /// Stop the reporter thread and clear the line.
    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.done.send(());
            let _ = thread.join();
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

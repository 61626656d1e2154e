use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use crossterm::{execute, queue};
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const TICK: Duration = Duration::from_millis(100);

/// Progress indicator shown while a blocking measurement runs.
pub struct Spinner {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Spinner {
    pub fn start(label: &'static str) -> Self {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let animate = io::stdout().is_tty();

        let handle = tokio::spawn(async move {
            let mut idx = 0usize;
            loop {
                if animate {
                    let mut out = io::stdout();
                    let _ = queue!(
                        out,
                        MoveToColumn(0),
                        Clear(ClearType::CurrentLine),
                        Print(frame(label, idx))
                    );
                    let _ = out.flush();
                }
                idx = idx.wrapping_add(1);

                tokio::select! {
                    _ = stop_rx.recv() => break,
                    _ = tokio::time::sleep(TICK) => {}
                }
            }

            let mut out = io::stdout();
            if animate {
                let _ = queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine));
            }
            let _ = execute!(out, Print(format!("{label}... Done!\n")));
        });

        Self { stop_tx, handle }
    }

    /// Signal the spinner and wait until its final line is written.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(()).await;
        let _ = self.handle.await;
    }
}

fn frame(label: &str, idx: usize) -> String {
    format!("{} {}", label, FRAMES[idx % FRAMES.len()])
}

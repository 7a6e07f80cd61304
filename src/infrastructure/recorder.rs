use crate::domain::market::bar::Bar;
use crate::infrastructure::csv_feed::BarCsvWriter;
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::io::Write;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Writes bars received over a channel to a CSV sink on a background thread.
///
/// The thread exits once every [`Sender`] has been dropped; [`BarRecorder::join`]
/// then returns the number of bars written.
pub struct BarRecorder {
    handle: JoinHandle<Result<usize>>,
}

impl BarRecorder {
    /// Spawns the writer thread and returns it with the sending half
    pub fn spawn<W>(sink: W) -> (Self, Sender<Bar>)
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = unbounded();
        (Self::spawn_with(rx, sink), tx)
    }

    pub fn spawn_with<W>(rx: Receiver<Bar>, sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let handle = thread::spawn(move || {
            let mut writer = BarCsvWriter::new(sink);
            let mut written = 0usize;
            for bar in rx.iter() {
                if let Err(e) = writer.write(&bar) {
                    error!("BarRecorder: {:#}", e);
                    continue;
                }
                written += 1;
                debug!("BarRecorder: recorded {} {}", bar.vt_symbol(), bar.datetime);
            }
            writer.flush()?;
            info!("BarRecorder: channel closed after {} bar(s)", written);
            Ok(written)
        });
        Self { handle }
    }

    pub fn join(self) -> Result<usize> {
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("Bar recorder thread panicked"))?
    }
}

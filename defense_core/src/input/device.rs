use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Sender;
use defense_data::model::Direction;
use log::{debug, info, warn};

use crate::input::events::InputEvent;

/// Reads newline-delimited `UP|DOWN|LEFT|RIGHT` tokens from an external
/// controller and forwards them as defense requests. Other lines are ignored.
pub struct DeviceReader {
    handle: JoinHandle<()>,
}

impl DeviceReader {
    pub fn spawn<R>(reader: R, sender: Sender<InputEvent>, epoch: Instant) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let handle = thread::spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else {
                    warn!("external controller read failed; ignoring it from now on");
                    break;
                };
                match Direction::from_device_token(&line) {
                    Some(direction) => {
                        let timestamp_ms = epoch.elapsed().as_millis() as u64;
                        if sender.send(InputEvent::device(timestamp_ms, direction)).is_err() {
                            break;
                        }
                    }
                    None => debug!("ignoring controller line {:?}", line.trim()),
                }
            }
        });
        Self { handle }
    }

    /// Opens a character device (e.g. `/dev/ttyACM0`). An unavailable device
    /// is not an error: the game continues with local input only.
    pub fn open(path: &Path, sender: Sender<InputEvent>, epoch: Instant) -> Option<Self> {
        match File::open(path) {
            Ok(file) => {
                info!("external controller connected on {}", path.display());
                Some(Self::spawn(BufReader::new(file), sender, epoch))
            }
            Err(e) => {
                warn!("external controller not available on {}: {e}", path.display());
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

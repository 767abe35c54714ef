use std::thread;

use tokio::sync::mpsc;

use crate::core::error::LoadError;
use crate::playback::gif::GifFrameSource;
use crate::playback::source::FrameSource;

/// Request to decode fetched bytes into a playable frame source.
#[derive(Debug)]
pub struct DecodeRequest {
    pub request_id: u64,
    pub bytes: Vec<u8>,
}

/// Result of a decode request, tagged with the originating request id so the
/// controller can discard results from superseded pipeline runs.
pub enum DecodeEvent {
    Done {
        request_id: u64,
        result: Result<Box<dyn FrameSource>, LoadError>,
    },
}

/// Handle to the background decode worker.
///
/// Decoding runs off the UI thread; results come back over a channel and are
/// drained non-blockingly by the controller each frame.
pub struct DecodeClient {
    request_sender: mpsc::UnboundedSender<DecodeRequest>,
    event_receiver: mpsc::UnboundedReceiver<DecodeEvent>,
}

impl DecodeClient {
    /// Spawns the decode worker thread.
    pub fn spawn() -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<DecodeRequest>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<DecodeEvent>();

        thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create decode runtime: {}", e);
                    return;
                }
            };

            rt.block_on(async {
                while let Some(request) = request_rx.recv().await {
                    let event_tx = event_tx.clone();

                    // Decoding is CPU-bound; keep it off the channel loop.
                    tokio::task::spawn_blocking(move || {
                        log::debug!(
                            "Decoding {} bytes (request {})",
                            request.bytes.len(),
                            request.request_id
                        );

                        let result = GifFrameSource::from_bytes(&request.bytes)
                            .map(|source| Box::new(source) as Box<dyn FrameSource>);

                        if event_tx
                            .send(DecodeEvent::Done {
                                request_id: request.request_id,
                                result,
                            })
                            .is_err()
                        {
                            log::debug!("Decode result dropped, controller is gone");
                        }
                    });
                }
            });
        });

        Self {
            request_sender: request_tx,
            event_receiver: event_rx,
        }
    }

    /// Test constructor: no worker; the caller plays the worker role through
    /// the returned channel endpoints.
    #[cfg(test)]
    pub(crate) fn manual() -> (
        Self,
        mpsc::UnboundedReceiver<DecodeRequest>,
        mpsc::UnboundedSender<DecodeEvent>,
    ) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                request_sender: request_tx,
                event_receiver: event_rx,
            },
            request_rx,
            event_tx,
        )
    }

    pub fn request(&self, request: DecodeRequest) {
        if self.request_sender.send(request).is_err() {
            log::error!("Failed to send decode request: worker is gone");
        }
    }

    /// Completed decode results (non-blocking).
    pub fn drain_events(&mut self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

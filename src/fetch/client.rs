use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::thread;

use lru::LruCache;
use tokio::sync::mpsc;

use crate::core::error::LoadError;
use crate::fetch::transport::{fetch_file, fetch_http, UriScheme};

/// Remote bodies kept around so that reloading a recently shown image does
/// not hit the network again.
const HTTP_CACHE_ENTRIES: usize = 8;

/// Request to fetch the bytes behind a resource uri.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub request_id: u64,
    pub uri: String,
    pub scheme: UriScheme,
}

/// Events from the fetch worker, tagged with the originating request id.
#[derive(Debug)]
pub enum FetchEvent {
    /// Download progress; only emitted when the total size is known.
    Progress {
        request_id: u64,
        bytes_received: u64,
        total_bytes: u64,
    },
    Done {
        request_id: u64,
        result: Result<Vec<u8>, LoadError>,
    },
}

/// Handle to the background fetch worker thread.
///
/// Requests overlap freely; a request superseded on the controller side is
/// simply left to finish and its events are discarded on arrival.
pub struct FetchClient {
    request_sender: mpsc::UnboundedSender<FetchRequest>,
    event_receiver: mpsc::UnboundedReceiver<FetchEvent>,
}

impl FetchClient {
    /// Spawns the fetch worker thread with its own async runtime.
    pub fn spawn() -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<FetchRequest>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<FetchEvent>();

        thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create fetch runtime: {}", e);
                    return;
                }
            };

            let cache: Arc<Mutex<LruCache<String, Vec<u8>>>> = Arc::new(Mutex::new(
                LruCache::new(NonZeroUsize::new(HTTP_CACHE_ENTRIES).unwrap()),
            ));

            rt.block_on(async {
                while let Some(request) = request_rx.recv().await {
                    let event_tx = event_tx.clone();
                    let cache = cache.clone();

                    tokio::spawn(async move {
                        let result = run_fetch(&request, &event_tx, &cache).await;
                        if event_tx
                            .send(FetchEvent::Done {
                                request_id: request.request_id,
                                result,
                            })
                            .is_err()
                        {
                            log::debug!("Fetch result dropped, controller is gone");
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
        mpsc::UnboundedReceiver<FetchRequest>,
        mpsc::UnboundedSender<FetchEvent>,
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

    pub fn request(&self, request: FetchRequest) {
        if self.request_sender.send(request).is_err() {
            log::error!("Failed to send fetch request: worker is gone");
        }
    }

    /// Pending fetch events (non-blocking).
    pub fn drain_events(&mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

async fn run_fetch(
    request: &FetchRequest,
    event_tx: &mpsc::UnboundedSender<FetchEvent>,
    cache: &Arc<Mutex<LruCache<String, Vec<u8>>>>,
) -> Result<Vec<u8>, LoadError> {
    match request.scheme {
        UriScheme::File => {
            log::debug!("Fetching file {} (request {})", request.uri, request.request_id);
            fetch_file(&request.uri).await
        }
        UriScheme::Http => {
            if let Some(bytes) = cache.lock().unwrap().get(&request.uri).cloned() {
                log::debug!("Cache hit for {} (request {})", request.uri, request.request_id);
                return Ok(bytes);
            }

            log::debug!("Downloading {} (request {})", request.uri, request.request_id);
            let request_id = request.request_id;
            let progress_tx = event_tx.clone();
            let result = fetch_http(&request.uri, |bytes_received, total_bytes| {
                let _ = progress_tx.send(FetchEvent::Progress {
                    request_id,
                    bytes_received,
                    total_bytes,
                });
            })
            .await;

            if let Ok(bytes) = &result {
                cache
                    .lock()
                    .unwrap()
                    .put(request.uri.clone(), bytes.clone());
            }
            result
        }
    }
}

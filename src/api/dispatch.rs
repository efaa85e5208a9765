use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::api::{self, ApiRequest, Backend};
use crate::event::AppEvent;

/// Runs backend requests on worker threads and posts the responses back into
/// the UI event channel.
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    tx: Sender<AppEvent>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>, tx: Sender<AppEvent>) -> Self {
        Self { backend, tx }
    }

    pub fn dispatch(&self, request: ApiRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("brick-request".to_string())
            .spawn(move || {
                let response = api::execute(backend.as_ref(), request);
                // The receiver is gone once the UI has shut down.
                let _ = tx.send(AppEvent::Api(response));
            });
        if let Err(err) = spawned {
            tracing::error!("failed to spawn request thread: {err}");
        }
    }

    pub fn dispatch_all(&self, requests: Vec<ApiRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }
}

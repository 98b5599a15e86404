//! Serving finished runs over HTTP.
//!
//! The runner publishes a tree into the [`ReportHolder`] only once it has
//! finished, so readers never see a run in progress. `GET /run` raises the
//! [`RunTrigger`] that the runner polls; `GET /data` serializes whatever run
//! was published last.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{debug, info, warn};
use tiny_http::{Header, Method, Response, Server};

use crate::error::HealthCheckError;
use crate::node::Node;
use crate::visit::ColumnarReport;

/// Body returned by `GET /run`.
pub const RUN_ACK: &str = "health check run requested";

/// Holds the last completed run.
#[derive(Default)]
pub struct ReportHolder {
    latest: Mutex<Option<Arc<Node>>>,
}

impl ReportHolder {
    /// Creates an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the published run with `root`.
    pub fn publish(&self, root: Arc<Node>) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(root);
    }

    /// Returns the last published run, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Node>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Columnar report of the last published run; empty when nothing has
    /// finished yet.
    #[must_use]
    pub fn report(&self) -> ColumnarReport {
        self.latest().map(|root| ColumnarReport::from_tree(&root)).unwrap_or_default()
    }
}

/// Request flag shared between the transport and the runner.
#[derive(Debug, Clone, Default)]
pub struct RunTrigger(Arc<AtomicBool>);

impl RunTrigger {
    /// Creates a trigger with no pending request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks for a fresh run.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consumes a pending request.
    #[must_use]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// Whether a request is pending.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A routed response, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
}

impl Reply {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), content_type: "text/plain; charset=utf-8" }
    }
}

/// Maps a request line to a reply.
#[must_use]
pub fn route(method: &Method, url: &str, holder: &ReportHolder, trigger: &RunTrigger) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Get, "/run") => {
            info!("run requested over HTTP");
            trigger.request();
            Reply::text(200, RUN_ACK)
        }
        (Method::Get, "/data") => match holder.report().to_json() {
            Ok(body) => Reply { status: 200, body, content_type: "application/json" },
            Err(e) => {
                warn!("failed to serialize report: {e}");
                Reply::text(500, "report serialization failed")
            }
        },
        _ => Reply::text(404, "not found"),
    }
}

/// HTTP front end serving [`route`] on a worker thread.
pub struct ReportServer {
    server: Arc<Server>,
    worker: Option<JoinHandle<()>>,
}

impl ReportServer {
    /// Binds `addr` and starts serving.
    ///
    /// # Errors
    ///
    /// Returns [`HealthCheckError::Transport`] if the address cannot be bound.
    pub fn start(
        addr: &str,
        holder: Arc<ReportHolder>,
        trigger: RunTrigger,
    ) -> Result<Self, HealthCheckError> {
        let server = Server::http(addr)
            .map_err(|e| HealthCheckError::Transport(format!("cannot bind {addr}: {e}")))?;
        let server = Arc::new(server);
        let incoming = Arc::clone(&server);
        let worker = std::thread::spawn(move || {
            for request in incoming.incoming_requests() {
                let reply = route(request.method(), request.url(), &holder, &trigger);
                debug!("{} {} -> {}", request.method(), request.url(), reply.status);
                let mut response =
                    Response::from_data(reply.body.into_bytes()).with_status_code(reply.status);
                if let Ok(header) =
                    Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
                {
                    response = response.with_header(header);
                }
                if let Err(e) = request.respond(response) {
                    warn!("failed to send response: {e}");
                }
            }
        });
        info!("serving reports on {addr}");
        Ok(Self { server, worker: Some(worker) })
    }

    /// Address the server is listening on.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Stops accepting requests and waits for the worker to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("report server worker panicked");
            }
        }
    }
}

impl Drop for ReportServer {
    fn drop(&mut self) {
        self.stop();
    }
}

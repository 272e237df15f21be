use crate::error::transport::TransportError;
use crate::launcher::{Bootstrap, ViewerBootstrap};
use crate::resolve::{Endpoint, resolve};
use crate::transport::connection::{Connection, DEFAULT_RECEIVE_TIMEOUT};
use crate::transport::retry::RetryPolicy;
use crate::transport::state::LinkState;

use common::ErrorLocation;

use std::fmt;
use std::io::Error as IoError;
use std::net::TcpStream;
use std::panic::Location;
use std::thread::sleep;
use std::time::Duration;

use log::{debug, error, info, trace, warn};

/// Establishes [`Connection`]s, starting the viewer when nobody listens.
pub struct Connector {
    bootstrap: Box<dyn Bootstrap>,
    policy: RetryPolicy,
    receive_timeout: Duration,
}

impl Connector {
    /// Connector that launches the viewer from `$SCROLLVIEW_PATH` and waits
    /// for it without limit.
    pub fn new() -> Self {
        Self {
            bootstrap: Box::new(ViewerBootstrap::from_env()),
            policy: RetryPolicy::unbounded(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    pub fn with_bootstrap(self, bootstrap: impl Bootstrap + 'static) -> Self {
        self.with_boxed_bootstrap(Box::new(bootstrap))
    }

    pub fn with_boxed_bootstrap(mut self, bootstrap: Box<dyn Bootstrap>) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_receive_timeout(mut self, receive_timeout: Duration) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    /// Connect to the viewer at `hostname:port`.
    ///
    /// One attempt is made first. If it fails the bootstrap is asked to start
    /// the viewer, then attempts repeat every policy interval until one
    /// succeeds. With the default policy this blocks until the viewer shows up.
    ///
    /// # Errors
    ///
    /// * [`TransportError::Resolve`] - `hostname` does not resolve
    /// * [`TransportError::RetriesExhausted`] - A bounded policy ran out
    /// * [`TransportError::Connect`] - The connected socket could not be set up
    #[track_caller]
    pub fn connect(&self, hostname: &str, port: u16) -> Result<Connection, TransportError> {
        transition(LinkState::Disconnected, LinkState::Connecting);

        let endpoint = resolve(hostname, port).inspect_err(|e| {
            error!("Error resolving name for viewer host {hostname}:{port}: {e}");
        })?;

        let mut schedule = self.policy.schedule();

        schedule.record_attempt();
        let mut last_error = match attempt(&endpoint) {
            Ok(stream) => return self.established(stream, schedule.attempts()),
            Err(e) => e,
        };
        debug!("Nothing listening at {endpoint}: {last_error}");

        if let Err(e) = self.bootstrap.launch() {
            warn!("Failed to start the viewer, waiting for a server anyway: {e}");
        }

        while schedule.can_attempt() {
            schedule.record_attempt();
            match attempt(&endpoint) {
                Ok(stream) => return self.established(stream, schedule.attempts()),
                Err(e) => last_error = e,
            }

            if !schedule.can_attempt() {
                break;
            }
            let Some(delay) = schedule.next_delay() else {
                break;
            };

            info!("Waiting for viewer server at {endpoint}...");
            trace!("Attempt {} failed: {last_error}", schedule.attempts());
            sleep(delay);
        }

        warn!(
            "Giving up on viewer at {endpoint} after {} attempts",
            schedule.attempts()
        );
        Err(TransportError::RetriesExhausted {
            endpoint: endpoint.to_string(),
            attempts: schedule.attempts(),
            location: ErrorLocation::from(Location::caller()),
            source: last_error,
        })
    }

    #[track_caller]
    fn established(&self, stream: TcpStream, attempts: u32) -> Result<Connection, TransportError> {
        let connection = Connection::from_stream(stream, self.receive_timeout)?;
        transition(LinkState::Connecting, LinkState::Connected);
        info!(
            "Connected to viewer at {} (attempt {attempts})",
            connection.endpoint()
        );
        Ok(connection)
    }
}

impl Default for Connector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("policy", &self.policy)
            .field("receive_timeout", &self.receive_timeout)
            .finish_non_exhaustive()
    }
}

/// Connect with the default [`Connector`].
#[track_caller]
pub fn connect(hostname: &str, port: u16) -> Result<Connection, TransportError> {
    Connector::new().connect(hostname, port)
}

fn attempt(endpoint: &Endpoint) -> Result<TcpStream, IoError> {
    TcpStream::connect(endpoint.address())
}

fn transition(from: LinkState, to: LinkState) {
    debug!("Viewer link {from} -> {to}");
}

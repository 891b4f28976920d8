//! Connection lifecycle state and blocking waits
//!
//! One mutex guards the connection state; two independent condvars sit on
//! top of it so a thread waiting for connection establishment and a thread
//! waiting for shutdown completion never contend on the same predicate.
//! Waits re-check their predicate in a loop against a fixed deadline; a
//! single wakeup is never trusted.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Lifecycle states of the session
///
/// `Error` is not terminal for the process but is cleared only by
/// constructing a new client; `Closing` persists until the transport
/// confirms shutdown completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
    Error,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Closing => "Closing",
            ConnectionState::Error => "Error",
        }
    }
}

/// Shared lifecycle state with wait/notify support
pub struct SessionState {
    state: Mutex<ConnectionState>,
    /// Signalled on transitions relevant to connection establishment
    connect_cv: Condvar,
    /// Signalled when shutdown completes (separate predicate from connect)
    close_cv: Condvar,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Disconnected),
            connect_cv: Condvar::new(),
            close_cv: Condvar::new(),
        }
    }

    /// Lock-protected read; safe from any thread
    pub fn get(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    /// Transition to the given state and wake every waiter on both signals
    pub fn transition(&self, next: ConnectionState) {
        let mut state = self.state.lock();
        if *state != next {
            debug!("State transition: {} -> {}", state.label(), next.label());
        }
        *state = next;
        drop(state);
        self.connect_cv.notify_all();
        self.close_cv.notify_all();
    }

    /// Disconnected -> Connecting, or `false` with no state change
    pub fn try_begin_connect(&self) -> bool {
        let mut state = self.state.lock();
        if *state != ConnectionState::Disconnected {
            return false;
        }
        *state = ConnectionState::Connecting;
        true
    }

    /// Connecting -> Connected with waiter wakeup, or `false` with no
    /// state change
    ///
    /// A stale open event (a connection racing `close()`, a transport
    /// misbehaving after an error) must not disturb whatever state the
    /// session has since moved to.
    pub fn try_complete_connect(&self) -> bool {
        let mut state = self.state.lock();
        if *state != ConnectionState::Connecting {
            return false;
        }
        *state = ConnectionState::Connected;
        drop(state);
        self.connect_cv.notify_all();
        true
    }

    /// Undo a `try_begin_connect` whose transport start failed
    pub fn abort_connect(&self) {
        let mut state = self.state.lock();
        if *state == ConnectionState::Connecting {
            *state = ConnectionState::Disconnected;
        }
    }

    /// Any non-Disconnected state -> Closing; `false` when already
    /// Disconnected (close is then a no-op)
    pub fn try_begin_close(&self) -> bool {
        let mut state = self.state.lock();
        if *state == ConnectionState::Disconnected {
            return false;
        }
        *state = ConnectionState::Closing;
        true
    }

    /// Block until Connected, a failure state, or the timeout
    ///
    /// Returns immediately without blocking when the state is already
    /// something other than Connecting or Connected. Returns `true` only
    /// when the state is Connected on exit.
    pub fn wait_for_connection(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            match *state {
                ConnectionState::Connected => return true,
                ConnectionState::Connecting => {}
                // Disconnected, Closing or Error: establishment cannot
                // succeed any more
                _ => return false,
            }
            if self.connect_cv.wait_until(&mut state, deadline).timed_out() {
                return *state == ConnectionState::Connected;
            }
        }
    }

    /// Block until shutdown completes (state leaves Closing) or the timeout
    ///
    /// Returns `true` when the transport confirmed completion within the
    /// bound.
    pub fn wait_for_close(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        while *state == ConnectionState::Closing {
            if self.close_cv.wait_until(&mut state, deadline).timed_out() {
                return *state != ConnectionState::Closing;
            }
        }
        true
    }

    /// Force the terminal state after a shutdown-wait timeout, so the
    /// client is usable even while the transport thread is still unwinding
    pub fn force_disconnected(&self) {
        self.transition(ConnectionState::Disconnected);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

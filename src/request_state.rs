/// Lifecycle of one logical request site (a lookup, an analysis).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState<T, E> {
    Idle,
    InFlight,
    Succeeded(T),
    Failed(E),
}

/// Tracks the state of a single request site. `begin` refuses to start a
/// second request while one is in flight.
#[derive(Debug)]
pub struct RequestTracker<T, E> {
    state: RequestState<T, E>,
}

impl<T, E> Default for RequestTracker<T, E> {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
        }
    }
}

impl<T, E> RequestTracker<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `InFlight`. Returns false, leaving the state untouched, if a
    /// request is already pending.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.state = RequestState::InFlight;
        true
    }

    /// Record the outcome of the pending request. Settling a tracker that was
    /// never started is ignored.
    pub fn settle(&mut self, result: Result<T, E>) {
        if !self.is_pending() {
            tracing::debug!("Ignoring settle on a request that is not in flight");
            return;
        }
        self.state = match result {
            Ok(value) => RequestState::Succeeded(value),
            Err(err) => RequestState::Failed(err),
        };
    }

    pub fn state(&self) -> &RequestState<T, E> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, RequestState::InFlight)
    }

    pub fn reset(&mut self) {
        self.state = RequestState::Idle;
    }
}

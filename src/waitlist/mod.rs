//! Waiting list module boundary
//!
//! The platform reserves this module for waiting-list queue placement and
//! opponent matching. None of that logic exists yet; the service only mounts
//! the boundary so wiring, health reporting, and deployment shape stay stable
//! when it lands.

// TODO: host queue placement and opponent matching once the booking API
// hands those flows over to this service.

/// Placeholder waiting list service with no implemented operations
#[derive(Debug, Default)]
pub struct WaitingListService;

impl WaitingListService {
    /// Create the (empty) service boundary; never fails
    pub fn new() -> Self {
        Self
    }
}

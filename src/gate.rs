//! Shared-secret gate in front of the admin console.
//!
//! This is a low-assurance check: no lockout, no rate limit, no expiry.

use tracing::{info, warn};

use crate::error::{LogbookError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// Which view the navigation fragment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Public,
    Admin,
}

impl Route {
    pub const ADMIN_FRAGMENT: &'static str = "#admin";

    /// `#admin` opens the console; any other fragment (including none) is public.
    pub fn from_fragment(fragment: &str) -> Self {
        if fragment.trim() == Self::ADMIN_FRAGMENT {
            Route::Admin
        } else {
            Route::Public
        }
    }

    pub fn fragment(&self) -> &'static str {
        match self {
            Route::Public => "",
            Route::Admin => Self::ADMIN_FRAGMENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    expected: String,
    state: GateState,
    route: Route,
}

impl AdminGate {
    pub fn new(expected_code: impl Into<String>) -> Self {
        Self {
            expected: expected_code.into(),
            state: GateState::Locked,
            route: Route::Public,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Unlock when `code` matches. A mismatch leaves the gate locked.
    /// Codes are only accepted from the admin view.
    pub fn submit(&mut self, code: &str) -> Result<()> {
        if self.route != Route::Admin {
            warn!("Entry code submitted outside the admin view");
            return Err(LogbookError::Locked);
        }
        if code == self.expected {
            self.state = GateState::Unlocked;
            info!("Admin console unlocked");
            Ok(())
        } else {
            self.state = GateState::Locked;
            warn!("Rejected admin entry code");
            Err(LogbookError::InvalidCredential)
        }
    }

    pub fn lock(&mut self) {
        if self.state == GateState::Unlocked {
            info!("Admin console locked");
        }
        self.state = GateState::Locked;
    }

    /// Follow a navigation change. Leaving the admin view locks the gate.
    pub fn navigate(&mut self, route: Route) {
        if self.route == Route::Admin && route != Route::Admin {
            self.lock();
        }
        self.route = route;
    }

    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(LogbookError::Locked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_locked() {
        let gate = AdminGate::new("acoustic2026");
        assert_eq!(gate.state(), GateState::Locked);
        assert!(matches!(gate.ensure_unlocked(), Err(LogbookError::Locked)));
    }

    #[test]
    fn test_correct_code_unlocks() {
        let mut gate = AdminGate::new("acoustic2026");
        gate.navigate(Route::Admin);
        gate.submit("acoustic2026").unwrap();
        assert!(gate.is_unlocked());
        assert!(gate.ensure_unlocked().is_ok());
    }

    #[test]
    fn test_wrong_code_stays_locked() {
        let mut gate = AdminGate::new("acoustic2026");
        gate.navigate(Route::Admin);
        for attempt in ["", "Acoustic2026", "acoustic2026 ", "electric2026"] {
            let err = gate.submit(attempt).unwrap_err();
            assert!(matches!(err, LogbookError::InvalidCredential));
            assert_eq!(gate.state(), GateState::Locked);
        }
        // No lockout after repeated failures
        gate.submit("acoustic2026").unwrap();
        assert!(gate.is_unlocked());
    }

    #[test]
    fn test_lock() {
        let mut gate = AdminGate::new("acoustic2026");
        gate.navigate(Route::Admin);
        gate.submit("acoustic2026").unwrap();
        gate.lock();
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn test_navigating_away_locks() {
        let mut gate = AdminGate::new("acoustic2026");
        gate.navigate(Route::from_fragment("#admin"));
        gate.submit("acoustic2026").unwrap();

        gate.navigate(Route::Admin);
        assert!(gate.is_unlocked());

        gate.navigate(Route::from_fragment(""));
        assert_eq!(gate.route(), Route::Public);
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn test_code_rejected_outside_admin_view() {
        let mut gate = AdminGate::new("acoustic2026");
        assert!(matches!(gate.submit("acoustic2026"), Err(LogbookError::Locked)));
        assert!(!gate.is_unlocked());

        gate.navigate(Route::Admin);
        gate.submit("acoustic2026").unwrap();
        assert!(gate.is_unlocked());
    }

    #[test]
    fn test_route_fragments() {
        assert_eq!(Route::from_fragment("#admin"), Route::Admin);
        assert_eq!(Route::from_fragment("#wishlist"), Route::Public);
        assert_eq!(Route::from_fragment(""), Route::Public);
        assert_eq!(Route::Admin.fragment(), "#admin");
    }
}

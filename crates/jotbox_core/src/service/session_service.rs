//! Session/auth gate use-case service.
//!
//! # Responsibility
//! - Log users in and out.
//! - Resolve a presented session token to the caller's `UserId`.
//!
//! # Invariants
//! - Per-client states are Anonymous -> Authenticated -> Anonymous; there is
//!   no intermediate state.
//! - A session belongs to exactly one user and stays valid until logout or
//!   expiry. Each successful resolution slides the expiry forward.
//! - Login failure is a bare `Unauthorized`; the failing factor is not exposed.

use crate::model::session::Session;
use crate::model::user::{User, UserId};
use crate::repo::session_repo::SessionRepository;
use crate::repo::user_repo::UserRepository;
use crate::service::account_service::AccountService;
use crate::service::ServiceError;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use uuid::Uuid;

/// Default session lifetime when callers do not configure one.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Time source used for session creation and expiry checks.
pub type Clock = fn() -> DateTime<Utc>;

/// Session gate over account and session repositories.
pub struct SessionService<U: UserRepository, S: SessionRepository> {
    accounts: AccountService<U>,
    sessions: S,
    ttl: Duration,
    clock: Clock,
}

impl<U: UserRepository, S: SessionRepository> SessionService<U, S> {
    pub fn new(users: U, sessions: S, ttl: Duration) -> Self {
        Self {
            accounts: AccountService::new(users),
            sessions,
            ttl,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock, e.g. to test expiry.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn accounts(&self) -> &AccountService<U> {
        &self.accounts
    }

    /// Registers an account and logs it in right away.
    pub fn register(&self, email: &str, password: &str) -> Result<(User, Session), ServiceError> {
        let user = self.accounts.register(email, password)?;
        let session = self.start_session(user.id)?;
        Ok((user, session))
    }

    /// Verifies credentials and opens a session for the account.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let Some(user) = self.accounts.verify(email, password)? else {
            info!("event=login module=sessions status=rejected");
            return Err(ServiceError::Unauthorized);
        };

        let purged = self.sessions.purge_expired((self.clock)())?;
        if purged > 0 {
            info!("event=session_purge module=sessions status=ok removed={purged}");
        }

        self.start_session(user.id)
    }

    /// Resolves the caller identity for a protected operation.
    pub fn require_session(&self, token: Option<&str>) -> Result<UserId, ServiceError> {
        let token = token.map(str::trim).filter(|value| !value.is_empty());
        let Some(token) = token else {
            return Err(ServiceError::Unauthorized);
        };

        match self.sessions.touch_session(token, (self.clock)(), self.ttl)? {
            Some(session) => Ok(session.user_id),
            None => {
                warn!("event=session_resolve module=sessions status=rejected reason=unknown_or_expired");
                Err(ServiceError::Unauthorized)
            }
        }
    }

    /// Ends the session. Unknown or already-ended tokens are not an error.
    pub fn logout(&self, token: &str) -> Result<(), ServiceError> {
        let removed = self.sessions.delete_session(token)?;
        info!("event=logout module=sessions status=ok removed={removed}");
        Ok(())
    }

    fn start_session(&self, user_id: UserId) -> Result<Session, ServiceError> {
        let now = (self.clock)();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.insert_session(&session)?;
        info!("event=login module=sessions status=ok user_id={user_id}");
        Ok(session)
    }
}

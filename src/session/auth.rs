//! Auth context: the logged-in user, persisted encrypted between runs.
//!
//! The context is an explicit value handed to whoever needs the current
//! user; there is no process-wide singleton.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::crypto::SessionCipher;
use super::store::SessionStore;
use crate::error::{AppError, Result};
use crate::models::User;

/// Days before the end date from which a subscription counts as expiring.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Decrypted session payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub login_time: DateTime<Utc>,
}

/// Subscription state of the logged-in account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// No end date, or more than a week left.
    Active,
    /// Ends within [`EXPIRY_WARNING_DAYS`]; carries the days left (0 = last day).
    ExpiringSoon(i64),
    Expired(NaiveDate),
}

impl Session {
    pub fn subscription_status(&self, today: NaiveDate) -> SubscriptionStatus {
        match self.user.subscription_end() {
            None => SubscriptionStatus::Active,
            Some(end) if end < today => SubscriptionStatus::Expired(end),
            Some(end) => {
                let left = (end - today).num_days();
                if left < EXPIRY_WARNING_DAYS {
                    SubscriptionStatus::ExpiringSoon(left)
                } else {
                    SubscriptionStatus::Active
                }
            }
        }
    }

    /// Gate for report features.
    pub fn require_subscription(&self, today: NaiveDate) -> Result<SubscriptionStatus> {
        match self.subscription_status(today) {
            SubscriptionStatus::Expired(end) => Err(AppError::SubscriptionExpired(end)),
            status => Ok(status),
        }
    }
}

/// Login state backed by a persistent ("remember me") and a session-scoped store.
pub struct AuthContext {
    cipher: SessionCipher,
    persistent: Box<dyn SessionStore>,
    session: Box<dyn SessionStore>,
    current: Option<Session>,
}

impl AuthContext {
    pub fn new(cipher: SessionCipher, persistent: Box<dyn SessionStore>, session: Box<dyn SessionStore>) -> Self {
        Self {
            cipher,
            persistent,
            session,
            current: None,
        }
    }

    /// Store `user` and make it current. `remember` selects the persistent store.
    pub fn login(&mut self, user: User, remember: bool) -> Result<&Session> {
        let session = Session {
            user,
            login_time: Utc::now(),
        };
        let blob = self.cipher.encrypt(&session)?;

        if remember {
            self.persistent.save(&blob)?;
            self.session.clear()?;
        } else {
            self.session.save(&blob)?;
            self.persistent.clear()?;
        }

        info!("Logged in as {} (remember: {remember})", session.user.email);
        let current = self.current.insert(session);
        Ok(&*current)
    }

    /// Load a stored session: persistent store first, then session store.
    ///
    /// Anything that fails to decrypt or parse counts as logged out and is
    /// removed from its store.
    pub fn restore(&mut self) -> Result<Option<&Session>> {
        self.current = None;

        for (name, store) in [("persistent", &self.persistent), ("session", &self.session)] {
            let Some(blob) = store.load()? else {
                continue;
            };
            match self.cipher.decrypt::<Session>(&blob) {
                Some(session) => {
                    self.current = Some(session);
                    break;
                }
                None => {
                    warn!("Discarding unreadable {name} session");
                    store.clear()?;
                }
            }
        }

        Ok(self.current.as_ref())
    }

    /// Forget the user in both stores.
    pub fn logout(&mut self) -> Result<()> {
        self.persistent.clear()?;
        self.session.clear()?;
        if let Some(session) = self.current.take() {
            info!("Logged out {}", session.user.email);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Current session or [`AppError::Unauthenticated`].
    pub fn require(&self) -> Result<&Session> {
        self.current.as_ref().ok_or(AppError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryStore;
    use std::sync::Arc;

    /// Store handle shared between the context and the test.
    #[derive(Clone, Default)]
    struct Shared(Arc<MemoryStore>);

    impl SessionStore for Shared {
        fn load(&self) -> Result<Option<String>> {
            self.0.load()
        }
        fn save(&self, blob: &str) -> Result<()> {
            self.0.save(blob)
        }
        fn clear(&self) -> Result<()> {
            self.0.clear()
        }
    }

    fn user(email: &str) -> User {
        User {
            id: 3,
            name: "Meera".to_string(),
            email: email.to_string(),
            mobile: String::new(),
            role: "admin".to_string(),
            company_name: String::new(),
            subscription_end_date: String::new(),
        }
    }

    fn context(secret: &str, persistent: &Shared, session: &Shared) -> AuthContext {
        AuthContext::new(
            SessionCipher::new(secret, 1_000).unwrap(),
            Box::new(persistent.clone()),
            Box::new(session.clone()),
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_remembered_login_restores() {
        let (p, s) = (Shared::default(), Shared::default());
        context("k", &p, &s).login(user("a@x.io"), true).unwrap();

        assert!(p.load().unwrap().is_some());
        assert!(s.load().unwrap().is_none());

        let mut fresh = context("k", &p, &s);
        let restored = fresh.restore().unwrap().unwrap();
        assert_eq!(restored.user, user("a@x.io"));
    }

    #[test]
    fn test_persistent_checked_before_session() {
        let (p, s) = (Shared::default(), Shared::default());
        let cipher = SessionCipher::new("k", 1_000).unwrap();
        let now = Utc::now();
        p.save(&cipher.encrypt(&Session { user: user("cookie@x.io"), login_time: now }).unwrap())
            .unwrap();
        s.save(&cipher.encrypt(&Session { user: user("tab@x.io"), login_time: now }).unwrap())
            .unwrap();

        let mut ctx = context("k", &p, &s);
        assert_eq!(ctx.restore().unwrap().unwrap().user.email, "cookie@x.io");
    }

    #[test]
    fn test_wrong_key_means_logged_out() {
        let (p, s) = (Shared::default(), Shared::default());
        context("k1", &p, &s).login(user("a@x.io"), false).unwrap();

        let mut other = context("k2", &p, &s);
        assert!(other.restore().unwrap().is_none());
        assert!(s.load().unwrap().is_none(), "bad blob cleared");
        assert!(matches!(other.require(), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn test_falls_through_to_session_store() {
        let (p, s) = (Shared::default(), Shared::default());
        p.save("garbage").unwrap();
        let cipher = SessionCipher::new("k", 1_000).unwrap();
        s.save(&cipher.encrypt(&Session { user: user("tab@x.io"), login_time: Utc::now() }).unwrap())
            .unwrap();

        let mut ctx = context("k", &p, &s);
        assert_eq!(ctx.restore().unwrap().unwrap().user.email, "tab@x.io");
        assert!(p.load().unwrap().is_none());
    }

    #[test]
    fn test_logout_clears_both() {
        let (p, s) = (Shared::default(), Shared::default());
        let mut ctx = context("k", &p, &s);
        ctx.login(user("a@x.io"), true).unwrap();
        ctx.logout().unwrap();

        assert!(ctx.current().is_none());
        assert!(p.load().unwrap().is_none());
        assert!(ctx.restore().unwrap().is_none());
    }

    #[test]
    fn test_subscription_status() {
        let mut session = Session {
            user: user("a@x.io"),
            login_time: Utc::now(),
        };
        let today = date("2025-03-10");
        assert_eq!(session.subscription_status(today), SubscriptionStatus::Active);

        session.user.subscription_end_date = "2025-04-30".to_string();
        assert_eq!(session.subscription_status(today), SubscriptionStatus::Active);

        session.user.subscription_end_date = "2025-03-12".to_string();
        assert_eq!(session.subscription_status(today), SubscriptionStatus::ExpiringSoon(2));

        session.user.subscription_end_date = "2025-03-10".to_string();
        assert_eq!(session.subscription_status(today), SubscriptionStatus::ExpiringSoon(0));
        assert!(session.require_subscription(today).is_ok());

        session.user.subscription_end_date = "2025-03-09".to_string();
        assert!(matches!(
            session.require_subscription(today),
            Err(AppError::SubscriptionExpired(end)) if end == date("2025-03-09")
        ));
    }
}

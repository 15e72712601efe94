//! Encrypted local session and subscription gating.

mod auth;
mod crypto;
mod store;

use std::path::Path;

pub use auth::{AuthContext, EXPIRY_WARNING_DAYS, Session, SubscriptionStatus};
pub use crypto::SessionCipher;
pub use store::{FileStore, MemoryStore, SessionStore};

use crate::config::SessionConfig;
use crate::error::Result;

/// File name of the remembered session under the data directory.
pub const PERSISTENT_FILE: &str = "session.json";
/// File name of the session-scoped entry under the per-user runtime directory.
pub const SESSION_FILE: &str = "session.json";

/// Auth context for the CLI: remembered logins under `data_dir` for
/// `remember_days`, plain logins under the per-user `runtime_dir` for
/// `session_hours`.
pub fn file_backed(config: &SessionConfig, data_dir: &Path, runtime_dir: &Path) -> Result<AuthContext> {
    let cipher = SessionCipher::new(config.secret_key.clone(), config.kdf_iterations)?;
    let persistent = FileStore::persistent(data_dir.join(PERSISTENT_FILE), config.remember_days);
    let session = FileStore::session(runtime_dir.join(SESSION_FILE), config.session_hours);
    Ok(AuthContext::new(cipher, Box::new(persistent), Box::new(session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn user() -> User {
        User {
            id: 1,
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            role: "admin".to_string(),
            company_name: "Acme Textiles".to_string(),
            subscription_end_date: String::new(),
        }
    }

    #[test]
    fn test_file_backed_keeps_stores_apart() {
        let data = tempfile::tempdir().unwrap();
        let run = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            secret_key: "secret".to_string(),
            kdf_iterations: 1_000,
            ..SessionConfig::default()
        };

        let mut auth = file_backed(&config, data.path(), run.path()).unwrap();
        auth.login(user(), false).unwrap();
        assert!(run.path().join(SESSION_FILE).exists());
        assert!(!data.path().join(PERSISTENT_FILE).exists());

        let mut again = file_backed(&config, data.path(), run.path()).unwrap();
        assert_eq!(again.restore().unwrap().map(|s| s.user.email.as_str()), Some("asha@example.com"));

        again.login(user(), true).unwrap();
        assert!(data.path().join(PERSISTENT_FILE).exists());
        assert!(!run.path().join(SESSION_FILE).exists());
    }
}

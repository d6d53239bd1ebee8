//! One-time-code authentication for the admin panel.
//!
//! Login is passwordless: a 6-digit code is emailed to the configured owner
//! address and exchanged for an opaque bearer token held in memory.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::sync::{Arc, Mutex};

use crate::models::AuthCode;
use crate::services::{EmailProvider, SessionRegistry};
use service_core::error::AppError;

const CODE_LENGTH: usize = 6;
const TOKEN_BYTES: usize = 32;

/// Storage for login codes and the owner address they are sent to.
#[async_trait]
pub trait AuthCodeStore: Send + Sync {
    async fn owner_email(&self) -> Result<Option<String>, AppError>;

    /// Invalidate every still-unused code; issuing a new code makes it the
    /// only redeemable one.
    async fn invalidate_unused(&self) -> Result<(), AppError>;

    async fn store_code(&self, code: &str, expires_at: DateTime<Utc>) -> Result<(), AppError>;

    /// Mark the most recent matching valid code used. A code can be
    /// redeemed at most once, even under concurrent verify requests.
    async fn redeem(&self, code: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct AuthService {
    codes: Arc<dyn AuthCodeStore>,
    email: Arc<dyn EmailProvider>,
    sessions: SessionRegistry,
    code_ttl: Duration,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        codes: Arc<dyn AuthCodeStore>,
        email: Arc<dyn EmailProvider>,
        sessions: SessionRegistry,
        config: &crate::config::AuthSettings,
    ) -> Self {
        Self {
            codes,
            email,
            sessions,
            code_ttl: Duration::minutes(config.code_ttl_minutes),
            session_ttl: Duration::hours(config.session_ttl_hours),
        }
    }

    /// Issue a fresh login code and email it to the configured owner.
    ///
    /// Returns the masked recipient address for display. A delivery failure
    /// is reported to the caller but the persisted code stays redeemable;
    /// that matches the original behavior and is intentional.
    #[tracing::instrument(skip(self))]
    pub async fn issue_code(&self) -> Result<String, AppError> {
        let recipient = self.codes.owner_email().await?.ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("no owner email address configured"))
        })?;

        self.codes.invalidate_unused().await?;

        let code = generate_code();
        let expires_at = Utc::now() + self.code_ttl;
        self.codes.store_code(&code, expires_at).await?;

        let subject = format!("Code de connexion : {}", code);
        self.email
            .send(&recipient, &subject, &build_code_email(&code))
            .await?;

        tracing::info!("login code issued");
        Ok(mask_email(&recipient))
    }

    /// Exchange a valid code for a session token.
    #[tracing::instrument(skip(self, code))]
    pub async fn verify_code(&self, code: &str) -> Result<String, AppError> {
        if code.len() != CODE_LENGTH {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "code must be {} characters",
                CODE_LENGTH
            )));
        }

        if !self.codes.redeem(code).await? {
            return Err(AppError::AuthError(anyhow::anyhow!("invalid or expired code")));
        }

        let token = generate_token();
        self.sessions.insert(token.clone(), self.session_ttl);
        tracing::info!("admin authenticated");
        Ok(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.sessions.is_valid(token)
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.revoke(token);
    }
}

/// In-memory code store for tests and local work without Postgres.
#[derive(Default)]
pub struct MemoryCodeStore {
    owner: Option<String>,
    codes: Mutex<Vec<AuthCode>>,
}

impl MemoryCodeStore {
    pub fn with_owner(owner: &str) -> Self {
        Self {
            owner: Some(owner.to_string()),
            codes: Mutex::new(Vec::new()),
        }
    }

    /// Most recently stored code, delivered or not.
    pub fn last_code(&self) -> Option<String> {
        self.codes
            .lock()
            .expect("code store lock poisoned")
            .last()
            .map(|c| c.code.clone())
    }
}

#[async_trait]
impl AuthCodeStore for MemoryCodeStore {
    async fn owner_email(&self) -> Result<Option<String>, AppError> {
        Ok(self.owner.clone())
    }

    async fn invalidate_unused(&self) -> Result<(), AppError> {
        for code in self
            .codes
            .lock()
            .expect("code store lock poisoned")
            .iter_mut()
        {
            code.used = true;
        }
        Ok(())
    }

    async fn store_code(&self, code: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut codes = self.codes.lock().expect("code store lock poisoned");
        let id = codes.len() as i32 + 1;
        codes.push(AuthCode {
            id,
            code: code.to_string(),
            expires_at,
            used: false,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn redeem(&self, code: &str) -> Result<bool, AppError> {
        let mut codes = self.codes.lock().expect("code store lock poisoned");
        match codes
            .iter_mut()
            .filter(|c| c.code == code && c.is_valid())
            .max_by_key(|c| c.created_at)
        {
            Some(entry) => {
                entry.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Uniformly random 6-digit code, `100000..=999999`.
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Opaque session token: 32 random bytes, hex encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Mask an email for display: first two characters of the local part stay
/// visible, the rest becomes asterisks, the domain is untouched.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 2 => {
            let visible: String = local.chars().take(2).collect();
            let stars = "*".repeat(local.chars().count() - 2);
            format!("{visible}{stars}@{domain}")
        }
        _ => email.to_string(),
    }
}

/// Styled HTML body for the login-code email.
fn build_code_email(code: &str) -> String {
    format!(
        r#"
    <div style="font-family:Arial,sans-serif;max-width:400px;margin:0 auto;background:#FFFAF8;border:1px solid #F5E1E8;border-radius:8px;overflow:hidden;">
      <div style="background:linear-gradient(135deg,#9E6B7B,#7A4F5D);padding:25px 30px;">
        <h1 style="margin:0;color:#fff;font-size:18px;font-weight:400;">🔐 Connexion Administration</h1>
      </div>
      <div style="padding:30px;text-align:center;">
        <p style="color:#3A2E32;font-size:14px;margin-bottom:20px;">Votre code de connexion :</p>
        <div style="font-size:36px;font-weight:700;letter-spacing:12px;color:#9E6B7B;padding:20px;background:#FDF5F7;border-radius:8px;border:2px dashed #E8C4CF;">
          {code}
        </div>
        <p style="color:#9E9090;font-size:12px;margin-top:20px;">Ce code expire dans 10 minutes.</p>
      </div>
      <div style="padding:12px 20px;background:#FDF5F7;text-align:center;font-size:11px;color:#C9A0AE;">
        La Mina à La Pate · Administration
      </div>
    </div>
    "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use crate::services::MockEmailService;

    struct FailingEmailService;

    #[async_trait]
    impl EmailProvider for FailingEmailService {
        async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> Result<(), AppError> {
            Err(AppError::EmailError("smtp unreachable".to_string()))
        }
    }

    fn settings() -> AuthSettings {
        AuthSettings {
            code_ttl_minutes: 10,
            session_ttl_hours: 24,
        }
    }

    fn auth_with(store: Arc<MemoryCodeStore>) -> AuthService {
        AuthService::new(
            store,
            Arc::new(MockEmailService),
            SessionRegistry::new(),
            &settings(),
        )
    }

    #[tokio::test]
    async fn issued_code_verifies_exactly_once() {
        let store = Arc::new(MemoryCodeStore::with_owner("contact@laminaalapate.fr"));
        let auth = auth_with(store.clone());

        let masked = auth.issue_code().await.unwrap();
        assert_eq!(masked, "co*****@laminaalapate.fr");

        let code = store.last_code().unwrap();
        let token = auth.verify_code(&code).await.unwrap();
        assert!(auth.is_valid(&token));

        // The code was consumed by the first redemption.
        assert!(matches!(
            auth.verify_code(&code).await,
            Err(AppError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let store = Arc::new(MemoryCodeStore::with_owner("owner@example.com"));
        store
            .store_code("654321", Utc::now() - Duration::minutes(1))
            .await
            .unwrap();
        let auth = auth_with(store);

        assert!(matches!(
            auth.verify_code("654321").await,
            Err(AppError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn issuing_a_new_code_invalidates_the_previous_one() {
        let store = Arc::new(MemoryCodeStore::with_owner("owner@example.com"));
        let auth = auth_with(store.clone());

        auth.issue_code().await.unwrap();
        let first = store.last_code().unwrap();
        auth.issue_code().await.unwrap();
        let second = store.last_code().unwrap();

        let token = auth.verify_code(&second).await.unwrap();
        assert!(auth.is_valid(&token));

        if first != second {
            assert!(matches!(
                auth.verify_code(&first).await,
                Err(AppError::AuthError(_))
            ));
        }
    }

    #[tokio::test]
    async fn wrong_length_code_is_a_bad_request() {
        let auth = auth_with(Arc::new(MemoryCodeStore::with_owner("owner@example.com")));
        assert!(matches!(
            auth.verify_code("123").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn missing_owner_email_is_a_config_error() {
        let auth = auth_with(Arc::new(MemoryCodeStore::default()));
        assert!(matches!(
            auth.issue_code().await,
            Err(AppError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn code_stays_redeemable_when_delivery_fails() {
        let store = Arc::new(MemoryCodeStore::with_owner("owner@example.com"));
        let auth = AuthService::new(
            store.clone(),
            Arc::new(FailingEmailService),
            SessionRegistry::new(),
            &settings(),
        );

        assert!(matches!(
            auth.issue_code().await,
            Err(AppError::EmailError(_))
        ));

        // The stored code survives the failed delivery and still works.
        let code = store.last_code().unwrap();
        assert!(auth.verify_code(&code).await.is_ok());
    }

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn generated_tokens_are_fixed_length_hex() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn masking_keeps_first_two_chars_and_domain() {
        assert_eq!(
            mask_email("contact@laminaalapate.fr"),
            "co*****@laminaalapate.fr"
        );
        assert_eq!(mask_email("marie@example.com"), "ma***@example.com");
    }

    #[test]
    fn masking_leaves_short_local_parts_alone() {
        assert_eq!(mask_email("ab@example.com"), "ab@example.com");
        assert_eq!(mask_email("a@example.com"), "a@example.com");
    }

    #[test]
    fn masking_without_at_sign_is_passthrough() {
        assert_eq!(mask_email("not-an-address"), "not-an-address");
    }

    #[test]
    fn code_email_contains_the_code() {
        assert!(build_code_email("123456").contains("123456"));
    }
}

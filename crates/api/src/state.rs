//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::AreaCache;
use crate::services::captcha::CaptchaGenerator;
use crate::services::sms::{LogSmsSender, SmsSender};
use crate::services::verify_code::VerifyCodeStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and the verification-code
/// store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    verify_codes: VerifyCodeStore,
    captcha: CaptchaGenerator,
    sms: Arc<dyn SmsSender>,
    areas: AreaCache,
}

impl AppState {
    /// Create a new application state with the default (logging) SMS sender.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        Self::with_sms_sender(config, pool, Arc::new(LogSmsSender))
    }

    /// Create a new application state with an explicit SMS sender.
    #[must_use]
    pub fn with_sms_sender(config: ApiConfig, pool: PgPool, sms: Arc<dyn SmsSender>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                verify_codes: VerifyCodeStore::new(),
                captcha: CaptchaGenerator::new(),
                sms,
                areas: AreaCache::new(),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the verification-code store.
    #[must_use]
    pub fn verify_codes(&self) -> &VerifyCodeStore {
        &self.inner.verify_codes
    }

    /// Get a reference to the image-code generator.
    #[must_use]
    pub fn captcha(&self) -> &CaptchaGenerator {
        &self.inner.captcha
    }

    /// Get a reference to the SMS sender.
    #[must_use]
    pub fn sms(&self) -> &dyn SmsSender {
        self.inner.sms.as_ref()
    }

    /// Get a reference to the area lookup cache.
    #[must_use]
    pub fn areas(&self) -> &AreaCache {
        &self.inner.areas
    }
}

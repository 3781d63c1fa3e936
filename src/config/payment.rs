//! Payment integration settings (Mercado Pago)
//!
//! This module resolves the `mercadopago` configuration namespace from
//! environment variables once at startup. Loading applies a default for every
//! variable, so it can never fail; the resulting struct is immutable.

use tracing::warn;

/// Namespace key under which these settings are registered
pub const PAYMENT_CONFIG_NAMESPACE: &str = "mercadopago";

/// Currency used for all preferences, regardless of environment input
pub const DEFAULT_CURRENCY: &str = "ARS";

/// Minutes until a payment preference expires
pub const DEFAULT_EXPIRATION_MINUTES: u32 = 30;

/// Mercado Pago API base used when MERCADOPAGO_API_URL is unset
pub const DEFAULT_API_BASE_URL: &str = "https://api.mercadopago.com";

/// Front-end base used when FRONTEND_URL is unset
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Webhook endpoint used when API_URL is unset
pub const FALLBACK_WEBHOOK_URL: &str = "http://localhost:3001/api/v1/webhooks/mercadopago";

/// Path appended to API_URL to build the webhook endpoint
pub const WEBHOOK_PATH: &str = "/api/v1/webhooks/mercadopago";

const SUCCESS_PATH: &str = "/payments/success";
const FAILURE_PATH: &str = "/payments/failure";
const PENDING_PATH: &str = "/payments/pending";

/// Immutable Mercado Pago settings resolved from the environment.
///
/// Credentials intentionally do not implement `Serialize`; the access token
/// and webhook secret must never end up in a wire shape or stats payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Public key handed to checkout clients
    pub default_public_key: String,
    /// Access token for server-side API calls
    pub default_access_token: String,
    /// Secret used to verify webhook signatures
    pub webhook_secret: String,
    /// Mercado Pago API base URL
    pub api_base_url: String,
    /// Whether the integration runs against the sandbox
    pub is_sandbox: bool,
    /// Currency for created preferences; always "ARS"
    pub default_currency: String,
    /// Minutes until a created preference expires
    pub expiration_minutes: u32,
    /// Where the payer lands after a successful payment
    pub default_success_url: String,
    /// Where the payer lands after a failed payment
    pub default_failure_url: String,
    /// Where the payer lands while a payment is pending
    pub default_pending_url: String,
    /// Endpoint Mercado Pago notifies about payment events
    pub webhook_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl PaymentConfig {
    /// Resolve the namespace from process environment variables.
    ///
    /// Idempotent for a fixed environment snapshot, and infallible: every
    /// variable has a default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the namespace through an arbitrary variable lookup.
    ///
    /// Empty values count as unset, matching the `env || default` posture of
    /// the rest of the platform.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let node_env = get("NODE_ENV").unwrap_or_else(|| "development".to_string());
        let frontend_url =
            get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

        let expiration_raw =
            get("MERCADOPAGO_EXPIRATION_MINUTES").unwrap_or_else(|| DEFAULT_EXPIRATION_MINUTES.to_string());
        // Zero would expire preferences immediately, so it gets the same
        // default-safe treatment as an unparseable value.
        let expiration_minutes = expiration_raw
            .parse()
            .ok()
            .filter(|&minutes: &u32| minutes > 0)
            .unwrap_or_else(|| {
                warn!(
                    "Unusable MERCADOPAGO_EXPIRATION_MINUTES value '{}', using default {}",
                    expiration_raw, DEFAULT_EXPIRATION_MINUTES
                );
                DEFAULT_EXPIRATION_MINUTES
            });

        let webhook_url = match get("API_URL") {
            Some(api_url) => format!("{}{}", api_url, WEBHOOK_PATH),
            None => FALLBACK_WEBHOOK_URL.to_string(),
        };

        Self {
            default_public_key: get("MERCADOPAGO_PUBLIC_KEY").unwrap_or_default(),
            default_access_token: get("MERCADOPAGO_ACCESS_TOKEN").unwrap_or_default(),
            webhook_secret: get("MERCADOPAGO_WEBHOOK_SECRET").unwrap_or_default(),
            api_base_url: get("MERCADOPAGO_API_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            is_sandbox: node_env != "production",
            default_currency: DEFAULT_CURRENCY.to_string(),
            expiration_minutes,
            default_success_url: format!("{}{}", frontend_url, SUCCESS_PATH),
            default_failure_url: format!("{}{}", frontend_url, FAILURE_PATH),
            default_pending_url: format!("{}{}", frontend_url, PENDING_PATH),
            webhook_url,
        }
    }
}

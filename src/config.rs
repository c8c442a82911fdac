use std::env;

use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    /// Marks the session cookie `Secure`; set when served over https.
    pub secure_cookies: bool,
    pub payments: PaymentConfig,
    pub shipping: ShippingRates,
    pub email: EmailConfig,
}

/// Payment gateway credentials and the hosted checkout parameters.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub api_base: String,
    pub secret_key: SecretString,
    pub webhook_secret: SecretString,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub allowed_countries: Vec<String>,
}

/// Gateway shipping-rate ids for each tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRates {
    pub under_50: String,
    pub under_100: String,
    pub free: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// `None` disables SMTP; mail is logged instead.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
    /// Shop owner inbox that receives new custom order notifications.
    pub owner_address: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = SecretString::from(env::var("JWT_SECRET")?);
        let secure_cookies = env::var("SECURE_COOKIES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            secure_cookies,
            payments: PaymentConfig::from_env()?,
            shipping: ShippingRates::from_env(),
            email: EmailConfig::from_env(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: SecretString::from("dev-secret"),
            secure_cookies: false,
            payments: PaymentConfig::default(),
            shipping: ShippingRates::default(),
            email: EmailConfig::default(),
        }
    }
}

impl PaymentConfig {
    fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_base: env::var("STRIPE_API_BASE").unwrap_or(defaults.api_base),
            secret_key: SecretString::from(env::var("STRIPE_SECRET_KEY")?),
            webhook_secret: SecretString::from(
                env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            ),
            currency: env::var("CHECKOUT_CURRENCY").unwrap_or(defaults.currency),
            success_url: env::var("CHECKOUT_SUCCESS_URL").unwrap_or(defaults.success_url),
            cancel_url: env::var("CHECKOUT_CANCEL_URL").unwrap_or(defaults.cancel_url),
            allowed_countries: env::var("CHECKOUT_ALLOWED_COUNTRIES")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.allowed_countries),
        })
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: SecretString::from(""),
            webhook_secret: SecretString::from(""),
            currency: "usd".to_string(),
            success_url: "http://localhost:5173/checkout/success".to_string(),
            cancel_url: "http://localhost:5173/checkout/cancel".to_string(),
            allowed_countries: vec!["US".to_string(), "CA".to_string()],
        }
    }
}

impl ShippingRates {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            under_50: env::var("SHIPPING_RATE_UNDER_50").unwrap_or(defaults.under_50),
            under_100: env::var("SHIPPING_RATE_UNDER_100").unwrap_or(defaults.under_100),
            free: env::var("SHIPPING_RATE_FREE").unwrap_or(defaults.free),
        }
    }
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            under_50: "shr_under_50".to_string(),
            under_100: "shr_under_100".to_string(),
            free: "shr_free".to_string(),
        }
    }
}

impl EmailConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(defaults.smtp_port),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: SecretString::from(env::var("SMTP_PASSWORD").unwrap_or_default()),
            from_address: env::var("EMAIL_FROM").unwrap_or(defaults.from_address),
            owner_address: env::var("OWNER_EMAIL").unwrap_or(defaults.owner_address),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: SecretString::from(""),
            from_address: "The Rugly Barnacle <shop@localhost>".to_string(),
            owner_address: "shop@localhost".to_string(),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_list_is_trimmed_and_uppercased() {
        assert_eq!(parse_list(" us, ca ,,mx"), vec!["US", "CA", "MX"]);
    }

    #[test]
    fn defaults_match_storefront_checkout() {
        let cfg = PaymentConfig::default();
        assert_eq!(cfg.currency, "usd");
        assert_eq!(cfg.allowed_countries, vec!["US", "CA"]);
    }
}

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Lower-case ISO currency code sent to the payment gateway.
    pub currency: String,
    pub payment_api_base: String,
    pub payment_secret_key: String,
    /// Used for checkout redirect URLs when the request carries no `Origin`.
    pub frontend_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let currency = env::var("CURRENCY")
            .unwrap_or_else(|_| "usd".to_string())
            .to_lowercase();
        let payment_api_base = env::var("PAYMENT_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());
        let payment_secret_key = env::var("PAYMENT_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("PAYMENT_SECRET_KEY is not set"))?;
        let frontend_origin = env::var("FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            currency,
            payment_api_base,
            payment_secret_key,
            frontend_origin,
        })
    }
}

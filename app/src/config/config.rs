use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_server_ip")]
    pub server_ip: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,

    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,

    /// Base URL the frontend is served from; invite links point here.
    pub app_base_url: String,

    pub mailer_api_url: String,
    pub mailer_api_key: String,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    pub billing_api_url: String,
    pub billing_api_key: String,
    pub billing_webhook_secret: String,

    #[serde(default = "default_invite_expiry_days")]
    pub invite_expiry_days: i64,

    #[serde(default = "default_free_credit_floor")]
    pub free_credit_floor: i32,

    #[serde(default = "default_refill_after_days")]
    pub refill_after_days: i64,

    #[serde(default = "default_purge_after_days")]
    pub purge_after_days: i64,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_port() -> u16 {
    8000
}
fn default_server_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    2
}
fn default_jwt_expiry_hours() -> i64 {
    24
}
fn default_mail_from() -> String {
    "no-reply@orgdeck.app".to_string()
}
fn default_invite_expiry_days() -> i64 {
    7
}
fn default_free_credit_floor() -> i32 {
    5
}
fn default_refill_after_days() -> i64 {
    30
}
fn default_purge_after_days() -> i64 {
    30
}
fn default_sweep_interval_secs() -> u64 {
    3600
}

impl Config {
    pub fn load_envs() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_vars() -> Vec<(String, String)> {
        [
            ("database_url", "postgres://localhost/orgdeck"),
            ("jwt_secret", "secret"),
            ("google_client_id", "cid"),
            ("google_client_secret", "csecret"),
            ("google_redirect_uri", "http://localhost:8000/api/auth/callback"),
            ("app_base_url", "http://localhost:3000"),
            ("mailer_api_url", "https://mail.example.com"),
            ("mailer_api_key", "mk"),
            ("billing_api_url", "https://billing.example.com"),
            ("billing_api_key", "bk"),
            ("billing_webhook_secret", "whsec"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn applies_defaults_for_tunables() {
        let config: Config = envy::from_iter(required_vars()).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.invite_expiry_days, 7);
        assert_eq!(config.free_credit_floor, 5);
        assert_eq!(config.refill_after_days, 30);
        assert_eq!(config.purge_after_days, 30);
    }

    #[test]
    fn env_overrides_beat_defaults() {
        let mut vars = required_vars();
        vars.push(("invite_expiry_days".to_string(), "14".to_string()));
        vars.push(("free_credit_floor".to_string(), "10".to_string()));

        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.invite_expiry_days, 14);
        assert_eq!(config.free_credit_floor, 10);
    }
}

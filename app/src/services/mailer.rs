use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::config::config::Config;

#[derive(Debug, Serialize)]
struct MailPayload {
    from: String,
    to: String,
    subject: String,
    html: String,
}

pub async fn send_invite_email(
    config: &Config,
    to: &str,
    org_name: &str,
    token: &str,
) -> anyhow::Result<()> {
    let accept_link = format!(
        "{}/invite/{}",
        config.app_base_url.trim_end_matches('/'),
        token
    );

    let payload = MailPayload {
        from: config.mail_from.clone(),
        to: to.to_string(),
        subject: format!("You've been invited to join {}", org_name),
        html: format!(
            "<p>You've been invited to join <strong>{}</strong>.</p>\
             <p><a href=\"{}\">Accept the invitation</a></p>\
             <p>This link expires in {} days.</p>",
            org_name, accept_link, config.invite_expiry_days
        ),
    };

    let http_client = Client::new();
    let response = http_client
        .post(format!(
            "{}/v1/send",
            config.mailer_api_url.trim_end_matches('/')
        ))
        .header("Authorization", format!("Bearer {}", config.mailer_api_key))
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Mail provider returned {}",
            response.status()
        ));
    }

    info!("Invitation email dispatched to {}", to);
    Ok(())
}

/// Best-effort dispatch. The invitation row is the source of truth; a
/// mail failure is logged and never rolls the record back.
pub fn dispatch_invite_email(config: Config, to: String, org_name: String, token: String) {
    tokio::spawn(async move {
        if let Err(e) = send_invite_email(&config, &to, &org_name, &token).await {
            error!("Failed to send invitation email to {}: {}", to, e);
        }
    });
}

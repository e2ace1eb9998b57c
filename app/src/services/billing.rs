use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::config::Config;

/// Events delivered by the payment processor's webhook.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BillingEvent {
    /// A completed checkout buys a credit pack for an organization.
    #[serde(rename = "checkout.completed")]
    CheckoutCompleted {
        organization_id: String,
        credits: i32,
    },
    /// Subscription lifecycle changes flip the paid flag.
    #[serde(rename = "subscription.updated")]
    SubscriptionUpdated {
        organization_id: String,
        active: bool,
        customer_id: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct CheckoutRequest {
    organization_id: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    url: String,
}

/// Creates a hosted checkout session at the payment processor and
/// returns the URL the caller should redirect to.
pub async fn create_checkout_session(config: &Config, org_id: &str) -> anyhow::Result<String> {
    let base = config.app_base_url.trim_end_matches('/');
    let request = CheckoutRequest {
        organization_id: org_id.to_string(),
        success_url: format!("{}/billing/success", base),
        cancel_url: format!("{}/billing", base),
    };

    let http_client = Client::new();
    let response = http_client
        .post(format!(
            "{}/v1/checkout/sessions",
            config.billing_api_url.trim_end_matches('/')
        ))
        .header("Authorization", format!("Bearer {}", config.billing_api_key))
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Payment provider returned {}",
            response.status()
        ));
    }

    let session = response.json::<CheckoutResponse>().await?;
    Ok(session.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_checkout_completed_events() {
        let event: BillingEvent = serde_json::from_str(
            r#"{"type": "checkout.completed", "organization_id": "org_1", "credits": 100}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            BillingEvent::CheckoutCompleted {
                organization_id: "org_1".to_string(),
                credits: 100,
            }
        );
    }

    #[test]
    fn parses_subscription_updated_events() {
        let event: BillingEvent = serde_json::from_str(
            r#"{"type": "subscription.updated", "organization_id": "org_1", "active": true, "customer_id": "cus_9"}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            BillingEvent::SubscriptionUpdated {
                organization_id: "org_1".to_string(),
                active: true,
                customer_id: Some("cus_9".to_string()),
            }
        );
    }

    #[test]
    fn unknown_event_types_fail_to_parse() {
        let result: Result<BillingEvent, _> =
            serde_json::from_str(r#"{"type": "invoice.created", "organization_id": "org_1"}"#);
        assert!(result.is_err());
    }
}

use crate::config::NewsletterConfig;
use crate::email::{ContactList, EmailSender, OutgoingEmail};
use crate::error::{NewsletterError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default timeout for HTTP requests (10 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Header the API uses to deduplicate retried sends
const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Resend mail API client (contacts and transactional e-mail)
pub struct ResendClient {
    client: ClientWithMiddleware,
    api_url: String,
    api_key: String,
    audience_id: String,
    from: String,
}

impl ResendClient {
    /// Create a client with a 10-second timeout and 3 retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is incomplete or the HTTP client cannot be created.
    pub fn new(config: &NewsletterConfig) -> Result<Self> {
        config.validate()?;

        // Base client with timeout
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("BeingMindful/1.0 (https://being-mindful.com)")
            .build()?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(DEFAULT_MAX_RETRIES);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            audience_id: config.audience_id.clone(),
            from: config.from.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn request<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
        idempotency_key: Option<&str>,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }
        request
    }

    async fn post<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
        idempotency_key: Option<&str>,
    ) -> Result<String> {
        debug!("Resend POST {}", path);
        let response = self.request(path, body, idempotency_key).send().await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Resend response status: {}", status);

        if status.is_success() {
            Ok(text)
        } else {
            Err(api_error(status, &text))
        }
    }
}

/// Key shared by every retry of one send, so the API delivers it once.
fn idempotency_key(to: &str) -> String {
    format!("{}/{}", to, Uuid::new_v4())
}

#[derive(Debug, Serialize)]
struct CreateContactRequest<'a> {
    email: &'a str,
    unsubscribed: bool,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    cc: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    bcc: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Error body returned by the API.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a failed response to an error, preferring the JSON `message` field.
fn api_error(status: StatusCode, body: &str) -> NewsletterError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    NewsletterError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ContactList for ResendClient {
    async fn add_contact(&self, email: &str) -> Result<()> {
        info!("Adding contact to audience {}", self.audience_id);
        let path = format!("audiences/{}/contacts", self.audience_id);
        let body = CreateContactRequest {
            email,
            unsubscribed: false,
        };

        self.post(&path, &body, None)
            .await
            .map(|_| ())
            .map_err(|e| contact_error(email, e))
    }
}

/// The API reports a duplicate contact as a plain error message.
fn contact_error(email: &str, err: NewsletterError) -> NewsletterError {
    match err {
        NewsletterError::Api { ref message, .. } if message.contains("already exists") => {
            NewsletterError::AlreadySubscribed {
                email: email.to_string(),
            }
        }
        other => {
            warn!("Could not add contact: {}", other);
            other
        }
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        info!("Sending \"{}\" to {}", email.subject, email.to);
        let body = SendEmailRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            reply_to: email.reply_to.as_deref(),
            cc: &email.cc,
            bcc: &email.bcc,
        };

        let key = idempotency_key(&email.to);
        let response = self.post("emails", &body, Some(&key)).await?;
        let sent: SendEmailResponse = serde_json::from_str(&response)?;
        info!("Email accepted by Resend (id: {})", sent.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_API_URL, DEFAULT_FROM};

    fn config() -> NewsletterConfig {
        NewsletterConfig {
            api_key: "re_test".into(),
            audience_id: "aud_1".into(),
            from: DEFAULT_FROM.into(),
            api_url: format!("{DEFAULT_API_URL}/"),
        }
    }

    #[test]
    fn test_new_rejects_missing_key() {
        let mut config = config();
        config.api_key.clear();
        assert!(matches!(
            ResendClient::new(&config),
            Err(NewsletterError::Core(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ResendClient::new(&config()).unwrap();
        assert_eq!(client.endpoint("emails"), "https://api.resend.com/emails");
        assert_eq!(
            client.endpoint("/audiences/aud_1/contacts"),
            "https://api.resend.com/audiences/aud_1/contacts"
        );
    }

    #[test]
    fn test_request_bodies() {
        let contact = serde_json::to_value(CreateContactRequest {
            email: "ana@example.com",
            unsubscribed: false,
        })
        .unwrap();
        assert_eq!(
            contact,
            serde_json::json!({ "email": "ana@example.com", "unsubscribed": false })
        );

        let email = serde_json::to_value(SendEmailRequest {
            from: DEFAULT_FROM,
            to: ["ana@example.com"],
            subject: "Oi",
            html: "<p>Oi</p>",
            reply_to: None,
            cc: &[],
            bcc: &[],
        })
        .unwrap();
        assert_eq!(email["to"], serde_json::json!(["ana@example.com"]));
        assert_eq!(email["from"], DEFAULT_FROM);
        assert!(email.get("reply_to").is_none());
        assert!(email.get("cc").is_none());
        assert!(email.get("bcc").is_none());
    }

    #[test]
    fn test_request_body_extra_recipients() {
        let cc = vec!["equipe@example.com".to_string()];
        let email = serde_json::to_value(SendEmailRequest {
            from: DEFAULT_FROM,
            to: ["contato@example.com"],
            subject: "Oi",
            html: "<p>Oi</p>",
            reply_to: Some("ana@example.com"),
            cc: &cc,
            bcc: &[],
        })
        .unwrap();
        assert_eq!(email["reply_to"], "ana@example.com");
        assert_eq!(email["cc"], serde_json::json!(["equipe@example.com"]));
        assert!(email.get("bcc").is_none());
    }

    #[test]
    fn test_send_request_carries_idempotency_key() {
        let client = ResendClient::new(&config()).unwrap();
        let body = serde_json::json!({ "subject": "Oi" });
        let request = client
            .request("emails", &body, Some("ana@example.com/key-1"))
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "https://api.resend.com/emails");
        assert_eq!(request.headers()["Idempotency-Key"], "ana@example.com/key-1");
        assert_eq!(request.headers()["Authorization"], "Bearer re_test");

        let request = client.request("audiences/aud_1/contacts", &body, None).build().unwrap();
        assert!(request.headers().get("Idempotency-Key").is_none());
    }

    #[test]
    fn test_idempotency_key_is_unique_per_send() {
        let first = idempotency_key("ana@example.com");
        let second = idempotency_key("ana@example.com");
        assert!(first.starts_with("ana@example.com/"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_api_error_already_exists() {
        let err = api_error(
            StatusCode::CONFLICT,
            r#"{"statusCode":409,"message":"Contact already exists","name":"validation_error"}"#,
        );
        assert!(matches!(
            err,
            NewsletterError::Api { status: 409, ref message } if message == "Contact already exists"
        ));
    }

    #[test]
    fn test_duplicate_contact_names_the_email() {
        let err = contact_error(
            "ana@example.com",
            api_error(StatusCode::CONFLICT, r#"{"message":"Contact already exists"}"#),
        );
        assert!(matches!(
            err,
            NewsletterError::AlreadySubscribed { ref email } if email == "ana@example.com"
        ));

        let err = contact_error(
            "ana@example.com",
            api_error(StatusCode::UNAUTHORIZED, r#"{"message":"API key is invalid"}"#),
        );
        assert!(matches!(err, NewsletterError::Api { status: 401, .. }));
    }

    #[test]
    fn test_api_error_message() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"statusCode":401,"message":"API key is invalid"}"#,
        );
        assert!(matches!(
            err,
            NewsletterError::Api { status: 401, ref message } if message == "API key is invalid"
        ));
    }

    #[test]
    fn test_api_error_plain_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, " upstream down \n");
        assert!(matches!(
            err,
            NewsletterError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }
}

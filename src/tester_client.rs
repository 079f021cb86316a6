use crate::domain::{Tester, TesterIdentifier, TesterProfile, TesterSignup, TesterStatus};
use crate::telemetry::error_chain_fmt;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::Value;

/// Versioned path identifying our beta program on the Prefinery side.
pub const BETA_PATH_PREFIX: &str = "/api/v2/betas/8679";

/// Signups from this domain are internal test traffic; their IP address is
/// never recorded. Exact suffix match only.
pub const TRUSTED_EMAIL_SUFFIX: &str = "@lbry.io";

#[derive(Clone, Debug)]
pub struct TesterClient {
    base_url: String,
    http_client: Client,
    api_key: Secret<String>,
}

#[derive(thiserror::Error)]
pub enum PrefineryError {
    /// The HTTP exchange failed outright or produced no body at all.
    #[error("no response body from the Prefinery service")]
    Transport(#[source] Option<reqwest::Error>),
    /// The body was present but blank or undecodable where a payload was
    /// required.
    #[error("received empty or improperly encoded response")]
    Protocol { body: String },
    /// The service reported one or more errors of its own.
    #[error("{}", .messages.join("\n"))]
    Remote { messages: Vec<String> },
}

impl std::fmt::Debug for PrefineryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Request body for tester creation. Fields the caller left empty are
/// omitted entirely rather than sent as nulls.
#[derive(Debug, serde::Serialize)]
struct TesterDraft<'a> {
    email: &'a str,
    status: TesterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    invitation_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<TesterProfile>,
}

#[derive(Debug, serde::Serialize)]
struct CreateTesterBody<'a> {
    tester: TesterDraft<'a>,
}

impl TesterClient {
    pub fn new(base_url: String, api_key: Secret<String>, timeout: std::time::Duration) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            base_url,
            http_client,
            api_key,
        }
    }

    /// Look up a registered tester by numeric id or email address.
    ///
    /// Returns `Ok(None)` when no tester exists. The invitation code is
    /// stripped from the returned record.
    #[tracing::instrument(name = "Looking up a tester", skip(self, identifier))]
    pub async fn find_tester(
        &self,
        identifier: impl Into<TesterIdentifier>,
    ) -> Result<Option<Tester>, PrefineryError> {
        let tester = match identifier.into() {
            TesterIdentifier::Id(id) => self.find_tester_by_id(id).await?,
            TesterIdentifier::Email(email) => self.find_tester_by_email(&email).await?,
        };
        Ok(tester.map(Tester::into_redacted))
    }

    /// Look the email up and create a tester record if none exists yet.
    ///
    /// The invitation code is stripped from the returned record in both
    /// cases.
    #[tracing::instrument(
        name = "Signing up a tester",
        skip(self, signup),
        fields(tester_email = %signup.email)
    )]
    pub async fn find_or_create_tester(
        &self,
        signup: TesterSignup,
    ) -> Result<Tester, PrefineryError> {
        if let Some(existing) = self.find_tester_by_email(signup.email.as_ref()).await? {
            tracing::debug!("Tester is already registered, skipping creation");
            return Ok(existing.into_redacted());
        }
        let created = self.create_tester(draft_from_signup(&signup)).await?;
        Ok(created.into_redacted())
    }

    async fn find_tester_by_id(&self, id: u64) -> Result<Option<Tester>, PrefineryError> {
        let data = self.get(&format!("/testers/{}", id), &[]).await?;
        if is_blank(&data) {
            return Ok(None);
        }
        let tester = Tester::deserialize(&data).map_err(|_| PrefineryError::Protocol {
            body: data.to_string(),
        })?;
        Ok(Some(tester))
    }

    async fn find_tester_by_email(&self, email: &str) -> Result<Option<Tester>, PrefineryError> {
        let data = self.get("/testers", &[("email", email)]).await?;
        if !data.is_array() {
            return Ok(None);
        }
        let candidates: Vec<Tester> =
            Vec::deserialize(&data).map_err(|_| PrefineryError::Protocol {
                body: data.to_string(),
            })?;
        // The service can partial-match on the email; prefer the exact
        // address over whatever came first.
        let exact = candidates.iter().position(|candidate| {
            candidate
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        });
        Ok(candidates.into_iter().nth(exact.unwrap_or(0)))
    }

    #[tracing::instrument(
        name = "Creating a tester",
        skip(self, draft),
        fields(tester_email = %draft.email)
    )]
    async fn create_tester(&self, draft: TesterDraft<'_>) -> Result<Tester, PrefineryError> {
        // The service returns the created record; an empty body here is a
        // protocol violation, not a valid "created nothing".
        let data = self
            .post("/testers", &CreateTesterBody { tester: draft }, false)
            .await?;
        Tester::deserialize(&data).map_err(|_| PrefineryError::Protocol {
            body: data.to_string(),
        })
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value, PrefineryError> {
        let response = self
            .http_client
            .get(self.endpoint_url(endpoint))
            .query(&[("api_key", self.api_key.expose_secret().as_str())])
            .query(query)
            .header("Accept", "application/json")
            .header("Content-type", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach the Prefinery service: {:?}", e);
                PrefineryError::Transport(Some(e))
            })?;
        let body = response
            .text()
            .await
            .map_err(|e| PrefineryError::Transport(Some(e)))?;
        decode_response(&body, true)
    }

    async fn post<B>(
        &self,
        endpoint: &str,
        body: &B,
        allow_empty_response: bool,
    ) -> Result<Value, PrefineryError>
    where
        B: serde::Serialize,
    {
        let response = self
            .http_client
            .post(self.endpoint_url(endpoint))
            .query(&[("api_key", self.api_key.expose_secret().as_str())])
            .header("Accept", "application/json")
            .header("Content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach the Prefinery service: {:?}", e);
                PrefineryError::Transport(Some(e))
            })?;
        let raw_body = response
            .text()
            .await
            .map_err(|e| PrefineryError::Transport(Some(e)))?;
        decode_response(&raw_body, allow_empty_response)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}{}.json", self.base_url, BETA_PATH_PREFIX, endpoint)
    }
}

fn draft_from_signup(signup: &TesterSignup) -> TesterDraft<'_> {
    let invitation_code = signup
        .invitation_code
        .as_deref()
        .filter(|code| !code.is_empty());
    // The service only validates an invitation code at creation time when
    // the submitted status is `active`.
    let status = if invitation_code.is_some() {
        TesterStatus::Active
    } else {
        TesterStatus::Applied
    };
    let ip = if signup.email.as_ref().ends_with(TRUSTED_EMAIL_SUFFIX) {
        None
    } else {
        signup
            .client_context
            .ip_address
            .as_deref()
            .filter(|ip| !ip.is_empty())
    };
    let user_agent = signup
        .client_context
        .user_agent
        .as_deref()
        .filter(|ua| !ua.is_empty());
    let profile = if ip.is_none() && user_agent.is_none() {
        None
    } else {
        Some(TesterProfile {
            ip: ip.map(String::from),
            user_agent: user_agent.map(String::from),
        })
    };
    TesterDraft {
        email: signup.email.as_ref(),
        status,
        invitation_code,
        referrer_id: signup.referrer_id,
        profile,
    }
}

/// Interpret a raw Prefinery response body.
///
/// An empty body is always a transport failure, whatever the flag says;
/// call sites that treat "nothing found" as valid get that signal from a
/// decoded `null` or `[]`, never from a missing body.
fn decode_response(raw_body: &str, allow_empty_response: bool) -> Result<Value, PrefineryError> {
    if raw_body.is_empty() {
        return Err(PrefineryError::Transport(None));
    }

    let data: Value = serde_json::from_str(raw_body).unwrap_or(Value::Null);

    let is_empty_collection = matches!(&data, Value::Array(items) if items.is_empty())
        || matches!(&data, Value::Object(fields) if fields.is_empty());
    if !allow_empty_response && is_blank(&data) && !is_empty_collection {
        return Err(PrefineryError::Protocol {
            body: raw_body.to_owned(),
        });
    }

    if let Some(error) = data.get("error") {
        let message = match error.as_str() {
            Some(message) => message.to_owned(),
            None => error.to_string(),
        };
        return Err(PrefineryError::Remote {
            messages: vec![message],
        });
    }

    if let Some(errors) = data.get("errors").and_then(Value::as_array) {
        let messages = errors
            .iter()
            .filter_map(|error| error.get("message").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();
        return Err(PrefineryError::Remote { messages });
    }

    Ok(data)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

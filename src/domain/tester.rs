/// A participant record in the beta program, as returned by Prefinery.
///
/// The remote service owns the schema and is free to grow it; we only
/// name the fields this crate actually inspects and keep everything else
/// in `extra` so nothing is silently dropped.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct Tester {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TesterStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<TesterProfile>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Tester {
    /// Strip the invitation code so it never leaks to a caller.
    ///
    /// The code is a secret token gating program access; the service echoes
    /// it back on lookups and creates, and we must not pass it on.
    pub(crate) fn into_redacted(mut self) -> Self {
        self.invitation_code = None;
        self.extra.remove("invitation_code");
        self
    }
}

/// Tester lifecycle states, owned entirely by the remote service.
///
/// The client never validates transitions; it only ever submits
/// `Active` or `Applied` when creating a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TesterStatus {
    Applied,
    Invited,
    Imported,
    Rejected,
    Active,
    Suspended,
}

#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct TesterProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

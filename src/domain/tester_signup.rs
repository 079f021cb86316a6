use crate::domain::TesterEmailAddress;

/// Everything needed to register a new tester through the signup flow.
///
/// The remote IP and user agent are explicit inputs here rather than being
/// read from some ambient request context; the HTTP layer that accepts the
/// signup is responsible for extracting them and passing them down.
#[derive(Debug)]
pub struct TesterSignup {
    pub email: TesterEmailAddress,
    /// Secret token gating program access; validated by the remote service.
    pub invitation_code: Option<String>,
    /// Id of the tester who referred this signup, for attribution.
    pub referrer_id: Option<u64>,
    pub client_context: ClientContext,
}

/// Where the signup came from, as seen by the caller's HTTP layer.
#[derive(Debug, Default)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

use prefinery_client::configuration::PrefinerySettings;
use prefinery_client::telemetry::{get_subscriber, init_subscriber};
use prefinery_client::tester_client::{BETA_PATH_PREFIX, TesterClient};
use secrecy::Secret;
use std::sync::LazyLock;
use wiremock::MockServer;

// Ensure that the `tracing` stack is only initialised once using `LazyLock`
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestService {
    pub server: MockServer,
    pub client: TesterClient,
}

/// Stand up a mock Prefinery server and a client pointed at it, built
/// through the same settings path production code uses.
pub async fn spawn_service() -> TestService {
    // The first time `force` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    LazyLock::force(&TRACING);

    let server = MockServer::start().await;
    let settings = PrefinerySettings {
        base_url: server.uri(),
        api_key: Secret::new("test-api-key".to_string()),
        timeout_milliseconds: 2000,
    };
    let client = settings.client();

    TestService { server, client }
}

pub fn testers_path() -> String {
    format!("{}/testers.json", BETA_PATH_PREFIX)
}

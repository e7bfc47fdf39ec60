use std::time::Duration;

use reqwest::Client;

/// Some providers reject requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; spread-alert)";

/// Shared HTTP client for all adapters of one invocation.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The integration suite needs a reachable Postgres; skip cleanly otherwise.
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Unique-ish suffix so reruns against the same database don't collide on
/// the email/nickname unique constraints.
pub fn unique_tag() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:x}", nanos)
}

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/board-api");
        cmd.env("BOARD_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

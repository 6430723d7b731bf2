use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::StatusCode;
use serde_json::json;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub outbox_dir: PathBuf,
    pub avatars_dir: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Fresh scratch dirs per server so outbox scans never see another
        // run's mail
        let scratch = std::env::temp_dir().join(format!("contacts-api-test-{}", port));
        let outbox_dir = scratch.join("outbox");
        let avatars_dir = scratch.join("avatars");

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/contacts-api");
        cmd.env("CONTACTS_PORT", port.to_string())
            .env("CONTACTS_STORE", "memory")
            .env("MAIL_DRIVER", "file")
            .env("MAIL_OUTBOX_DIR", &outbox_dir)
            .env("AVATARS_DIR", &avatars_dir)
            .env("JWT_SECRET", "integration-test-secret")
            .env("BASE_URL", &base_url)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            outbox_dir,
            avatars_dir,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
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

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique per test-binary run, so a shared server never sees a duplicate
#[allow(dead_code)]
pub fn unique_email(tag: &str) -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let n = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@example.com", tag, std::process::id(), n)
}

/// Scan the file-mailer outbox for the verification link sent to `email`
#[allow(dead_code)]
pub fn verification_token_for(server: &TestServer, email: &str) -> Result<String> {
    let re = Regex::new(r"/api/auth/verify/([0-9a-f]{32})")?;

    for entry in std::fs::read_dir(&server.outbox_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let mail: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        if mail["to"] == email {
            if let Some(caps) = re.captures(mail["html_body"].as_str().unwrap_or_default()) {
                return Ok(caps[1].to_string());
            }
        }
    }

    anyhow::bail!(
        "no verification mail for {} under {}",
        email,
        server.outbox_dir.display()
    )
}

/// Register, claim the emailed verification link, log in, return the bearer
/// token
#[allow(dead_code)]
pub async fn register_and_login(
    server: &TestServer,
    client: &reqwest::Client,
    email: &str,
    password: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );

    let token = verification_token_for(server, email)?;
    let res = client
        .get(format!("{}/api/auth/verify/{}", server.base_url, token))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "verify failed: {}",
        res.status()
    );

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "login failed: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response missing token")
}

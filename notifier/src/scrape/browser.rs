//! Headless Firefox through geckodriver.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{page, EventEntry, EventSource};
use crate::error::Error;

const PANEL_ID: &str = "events-panel";
const CONNECT_ATTEMPTS: u32 = 20;
const CONNECT_BACKOFF: Duration = Duration::from_millis(250);

/// Loads the reservation page in a headless browser.
#[derive(Debug, Clone)]
pub struct BrowserSource {
    driver_path: PathBuf,
    url: String,
    page_timeout: Duration,
}

impl BrowserSource {
    pub fn new(
        driver_path: impl Into<PathBuf>,
        url: impl Into<String>,
        page_timeout: Duration,
    ) -> Self {
        Self {
            driver_path: driver_path.into(),
            url: url.into(),
            page_timeout,
        }
    }

    /// Rendered page HTML.
    async fn fetch_page(&self) -> Result<String, Error> {
        let driver = Geckodriver::spawn(&self.driver_path)?;
        let client = driver.connect().await?;

        let page = load_page(&client, &self.url, self.page_timeout).await;

        // The only close on every path out of the session.
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        page
    }
}

impl EventSource for BrowserSource {
    fn fetch_events(&mut self) -> Result<Option<Vec<EventEntry>>, Error> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let html = rt.block_on(self.fetch_page())?;
        Ok(page::parse_events(&html))
    }
}

async fn load_page(client: &Client, url: &str, timeout: Duration) -> Result<String, Error> {
    info!(url, "Loading page");
    client.goto(url).await?;

    match client
        .wait()
        .at_most(timeout)
        .for_element(Locator::Id(PANEL_ID))
        .await
    {
        Ok(_) => debug!("Events panel rendered"),
        Err(CmdError::WaitTimeout) => {
            debug!(timeout_secs = timeout.as_secs(), "Events panel did not appear")
        }
        Err(e) => return Err(e.into()),
    }

    Ok(client.source().await?)
}

/// A geckodriver child process, killed when dropped.
struct Geckodriver {
    child: Child,
    port: u16,
}

impl Geckodriver {
    fn spawn(path: &Path) -> Result<Self, Error> {
        let port = free_port()?;
        let child = Command::new(path)
            .arg("--port")
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::DriverLaunch {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(pid = child.id(), port, "Started geckodriver");
        Ok(Self { child, port })
    }

    /// Open a WebDriver session, retrying while geckodriver starts listening.
    async fn connect(&self) -> Result<Client, Error> {
        let url = format!("http://127.0.0.1:{}", self.port);
        let mut builder = ClientBuilder::native();
        builder.capabilities(headless_capabilities());

        let mut attempt = 1;
        loop {
            match builder.connect(&url).await {
                Ok(client) => return Ok(client),
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    debug!(attempt, error = %e, "geckodriver not ready");
                    attempt += 1;
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for Geckodriver {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "geckodriver already exited");
        }
        let _ = self.child.wait();
    }
}

fn headless_capabilities() -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({ "args": ["-headless"] }),
    );
    caps
}

/// A port that was free a moment ago. Another process can take it before
/// geckodriver binds it; the connect retries do not recover from that.
fn free_port() -> Result<u16, Error> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

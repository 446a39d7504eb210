use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::webdriver::BrowserKind;

/// Manages WebDriver processes (geckodriver, chromedriver) for the suite.
///
/// Scenarios never spawn drivers themselves; `Page::launch` asks the
/// global manager for a ready endpoint and the manager either reuses an
/// externally started driver on its standard port or spawns one itself.
pub struct DriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    kind: BrowserKind,
    child: Child,
    port: u16,
    url: String,
    #[cfg(unix)]
    process_group_id: Option<i32>,
}

impl Default for DriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a WebDriver is running for the given browser kind.
    /// Returns the URL to connect to.
    pub async fn ensure_driver(&self, kind: BrowserKind) -> Result<String> {
        // Reuse a managed driver if it is still answering
        let managed_urls: Vec<String> = {
            let processes = self.processes.lock().unwrap();
            processes
                .iter()
                .filter(|p| p.kind == kind)
                .map(|p| p.url.clone())
                .collect()
        };

        for url in managed_urls {
            if Self::verify_driver_ready(&url).await {
                debug!("Using existing managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // Check the standard port for an externally managed driver
        let standard_url = match kind {
            BrowserKind::Firefox => "http://localhost:4444",
            BrowserKind::Chrome => "http://localhost:9515",
        };

        if Self::is_driver_running(standard_url).await && Self::verify_driver_ready(standard_url).await
        {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url.to_string());
        }

        info!("WebDriver not detected, attempting to start automatically...");
        self.start_driver(kind).await
    }

    /// Start a WebDriver process
    async fn start_driver(&self, kind: BrowserKind) -> Result<String> {
        let port = Self::find_free_port(kind)?;
        let (command, args) = match kind {
            BrowserKind::Firefox => {
                info!("Starting geckodriver on port {}", port);
                ("geckodriver", vec!["--port".to_string(), port.to_string()])
            }
            BrowserKind::Chrome => {
                info!("Starting chromedriver on port {}", port);
                ("chromedriver", vec![format!("--port={}", port)])
            }
        };

        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Linux: Download from official releases\n\
                  Or see: https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/",
                command,
                command
            );
        }

        let mut cmd = Command::new(command);
        cmd.args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // On Unix, create a new process group so we can kill the entire tree
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().context(format!("Failed to start {}", command))?;

        #[cfg(unix)]
        let process_group_id = Some(child.id() as i32);

        let url = format!("http://localhost:{}", port);

        {
            let mut processes = self.processes.lock().unwrap();
            processes.push(DriverProcess {
                kind,
                child,
                port,
                url: url.clone(),
                #[cfg(unix)]
                process_group_id,
            });
        }

        // Wait for the driver to answer its status endpoint
        let max_attempts = 30; // 3 seconds total
        for attempt in 1..=max_attempts {
            if Self::is_driver_running(&url).await {
                info!("WebDriver started successfully on port {}", port);
                return Ok(url);
            }
            if attempt < max_attempts {
                sleep(Duration::from_millis(100)).await;
            }
        }

        self.cleanup_failed_process(port);
        anyhow::bail!("WebDriver failed to start within timeout")
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        {
            Command::new("which")
                .arg(command)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }

        #[cfg(windows)]
        {
            Command::new("where")
                .arg(command)
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        }
    }

    /// Find a free port, trying the driver's conventional ports first
    pub fn find_free_port(kind: BrowserKind) -> Result<u16> {
        let preferred_ports = match kind {
            BrowserKind::Firefox => [4444, 4445, 4446],
            BrowserKind::Chrome => [9515, 9516, 9517],
        };

        for port in preferred_ports {
            if !Self::is_port_in_use(port) {
                debug!("Found free port {} for {:?}", port, kind);
                return Ok(port);
            }
        }

        // Fall back to letting the OS assign a port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }

    /// Check if a port is in use
    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// Check if WebDriver answers at the given URL
    pub async fn is_driver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Verify that WebDriver reports itself ready for a new session
    async fn verify_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => {
                if let Ok(body) = response.json::<serde_json::Value>().await {
                    body.get("value")
                        .and_then(|v| v.get("ready"))
                        .and_then(|r| r.as_bool())
                        .unwrap_or(false)
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    }

    /// Kill any managed driver processes for a browser kind
    pub fn kill_driver(&self, kind: BrowserKind) {
        let mut processes = self.processes.lock().unwrap();
        let mut index = 0;
        while index < processes.len() {
            if processes[index].kind == kind {
                let mut process = processes.remove(index);
                info!("Killing managed WebDriver on port {}", process.port);

                #[cfg(unix)]
                if let Some(pgid) = process.process_group_id {
                    Self::kill_process_group(pgid);
                }

                let _ = process.child.kill();
            } else {
                index += 1;
            }
        }
    }

    /// Kill a process group on Unix systems
    #[cfg(unix)]
    fn kill_process_group(pgid: i32) {
        // SIGTERM first for graceful shutdown
        if let Err(e) = Command::new("kill")
            .args(["-TERM", &format!("-{}", pgid)])
            .output()
        {
            debug!("Failed to send SIGTERM to process group {}: {}", pgid, e);
        }

        std::thread::sleep(Duration::from_millis(100));

        if let Err(e) = Command::new("kill")
            .args(["-KILL", &format!("-{}", pgid)])
            .output()
        {
            debug!("Failed to send SIGKILL to process group {}: {}", pgid, e);
        }
    }

    /// Clean up a process that never became ready
    fn cleanup_failed_process(&self, port: u16) {
        let mut processes = self.processes.lock().unwrap();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            let mut process = processes.remove(index);

            #[cfg(unix)]
            if let Some(pgid) = process.process_group_id {
                info!(
                    "Killing process group {} for failed WebDriver on port {}",
                    pgid, port
                );
                Self::kill_process_group(pgid);
            }

            let _ = process.child.kill();
        }
    }
}

impl Drop for DriverManager {
    fn drop(&mut self) {
        let mut processes = self.processes.lock().unwrap();
        for process in processes.iter_mut() {
            #[cfg(unix)]
            if let Some(pgid) = process.process_group_id {
                Self::kill_process_group(pgid);
            }
            let _ = process.child.kill();
        }
        processes.clear();
    }
}

// Global driver manager instance
lazy_static::lazy_static! {
    pub static ref GLOBAL_DRIVER_MANAGER: DriverManager = DriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;

//! Token discovery and the OAuth device flow.
use std::io::BufRead as _;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::AuthError;
use crate::logging::Log;

/// OAuth app registered for the tool.
pub const CLIENT_ID: &str = "Ov23lilx93wDQB9QOLFW";
const SCOPE: &str = "repo";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// First non-empty token among `explicit`, `GITHUB_TOKEN`, and `GH_TOKEN`.
#[must_use]
pub fn token_from_env(explicit: Option<&str>) -> Option<String> {
    let env = |name: &str| std::env::var(name).ok();
    [explicit.map(String::from), env("GITHUB_TOKEN"), env("GH_TOKEN")]
        .into_iter()
        .flatten()
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

#[derive(Debug, Deserialize)]
struct DeviceCode {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default = "default_interval")]
    interval: u64,
    expires_in: u64,
}

const fn default_interval() -> u64 {
    5
}

/// One answer from the token endpoint.
#[derive(Debug, Deserialize, PartialEq, Eq)]
struct TokenReply {
    access_token: Option<String>,
    error: Option<String>,
    interval: Option<u64>,
}

/// What to do after a token poll.
#[derive(Debug, PartialEq, Eq)]
enum Poll {
    Done(String),
    Wait,
    SlowDown(u64),
}

fn interpret(reply: TokenReply) -> Result<Poll, AuthError> {
    if let Some(token) = reply.access_token.filter(|t| !t.is_empty()) {
        return Ok(Poll::Done(token));
    }
    match reply.error.as_deref() {
        Some("authorization_pending") => Ok(Poll::Wait),
        Some("slow_down") => Ok(Poll::SlowDown(reply.interval.unwrap_or(5))),
        Some("access_denied") => Err(AuthError::Denied),
        Some("expired_token") => Err(AuthError::Expired),
        Some(other) => Err(AuthError::DeviceFlow(other.to_string())),
        None => Err(AuthError::DeviceFlow("empty token response".to_string())),
    }
}

/// Print the verification page and user code, and try to open the page.
/// A failure to open it is only logged at debug level.
fn present<F>(code: &DeviceCode, log: &dyn Log, open_page: F)
where
    F: FnOnce(&str) -> std::io::Result<()>,
{
    log.info("Authenticate your account at:");
    log.info(&code.verification_uri);
    log.info(&format!("and enter the code: {}", code.user_code));
    match open_page(&code.verification_uri) {
        Ok(()) => log.debug("opened the verification page in the default browser"),
        Err(e) => log.debug(&format!("could not open a browser: {e}")),
    }
}

fn copy_to_clipboard(text: &str, log: &dyn Log) -> Option<arboard::Clipboard> {
    let copied = arboard::Clipboard::new().and_then(|mut clipboard| {
        clipboard.set_text(text)?;
        Ok(clipboard)
    });
    match copied {
        Ok(clipboard) => {
            log.info("The code has been copied to your clipboard.");
            Some(clipboard)
        }
        Err(e) => {
            log.debug(&format!("clipboard unavailable: {e}"));
            None
        }
    }
}

/// Runs the OAuth device flow against a GitHub web root.
#[derive(Debug)]
pub struct DeviceFlow {
    agent: ureq::Agent,
    server_url: String,
}

impl DeviceFlow {
    /// Device flow against `server_url` (e.g. `https://github.com`).
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn post<T: for<'de> Deserialize<'de>>(&self, path: &str, form: &[(&str, &str)]) -> Result<T, AuthError> {
        let url = format!("{}{path}", self.server_url);
        self.agent
            .post(&url)
            .header("Accept", "application/json")
            .send_form(form.iter().copied())
            .and_then(|mut response| response.body_mut().read_json())
            .map_err(|e| AuthError::DeviceFlow(e.to_string()))
    }

    /// Ask the operator to authorise the app and wait for the token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the flow is denied, expires, or fails.
    pub fn run(&self, log: &dyn Log) -> Result<String, AuthError> {
        let code: DeviceCode = self.post(
            "/login/device/code",
            &[("client_id", CLIENT_ID), ("scope", SCOPE)],
        )?;

        present(&code, log, webbrowser::open);
        // X11 drops the selection with its owner; hold it until ENTER.
        let _clipboard = copy_to_clipboard(&code.user_code, log);
        log.info("Press ENTER once you have authorised the app...");
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(AuthError::Prompt)?;

        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = code.interval;
        loop {
            if Instant::now() >= deadline {
                return Err(AuthError::Expired);
            }
            let reply: TokenReply = self.post(
                "/login/oauth/access_token",
                &[
                    ("client_id", CLIENT_ID),
                    ("device_code", code.device_code.as_str()),
                    ("grant_type", GRANT_TYPE),
                ],
            )?;
            match interpret(reply)? {
                Poll::Done(token) => {
                    log.debug("device flow authorised");
                    return Ok(token);
                }
                Poll::Wait => {}
                Poll::SlowDown(next) => interval = next.max(interval + 5),
            }
            std::thread::sleep(Duration::from_secs(interval));
        }
    }
}

/// Token from the flags or environment, falling back to the device flow.
///
/// # Errors
///
/// Returns [`AuthError`] if the device flow fails.
pub fn resolve_token(explicit: Option<&str>, server_url: &str, log: &dyn Log) -> Result<String, AuthError> {
    if let Some(token) = token_from_env(explicit) {
        log.debug("using token from flags or environment");
        return Ok(token);
    }
    DeviceFlow::new(server_url).run(log)
}

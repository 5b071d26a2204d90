//! Chrome automation for the GitHub web UI.
//!
//! Category CRUD and discussion pinning have no API, so they are driven
//! through a real browser session. The session owns a private Tokio runtime
//! and blocks on every command, so callers stay synchronous.
pub mod categories;
pub mod discussions;
pub mod scrape;

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, mpsc};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt as _;

use crate::error::BrowserError;
use crate::github::RepoRef;
use crate::logging::Log;

/// How long the operator has to sign in.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Grace period for a navigation to settle; its absence is tolerated.
const SETTLE: Duration = Duration::from_secs(1);

/// Executables tried, in order, when `CHROME` is unset.
const CHROME_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Chrome binary from `CHROME`, or the first known name on `PATH`.
///
/// `None` lets the launcher use its own detection.
#[must_use]
pub fn find_chrome() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CHROME").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    CHROME_NAMES.iter().find_map(|name| which::which(name).ok())
}

/// Serialise `value` as a JavaScript literal.
pub(crate) fn js(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Report each line read from `reader` as `true`, or `false` for a read
/// error. End of input counts as a final line; the reader thread then stops.
fn spawn_line_reader<R>(mut reader: R) -> mpsc::Receiver<bool>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        loop {
            let mut line = String::new();
            let read = reader.read_line(&mut line);
            let more = matches!(read, Ok(n) if n > 0);
            if tx.send(read.is_ok()).is_err() || !more {
                break;
            }
        }
    });
    rx
}

/// The stdin reader shared by every wait; it is started on first use.
fn stdin_lines() -> &'static Mutex<mpsc::Receiver<bool>> {
    static LINES: OnceLock<Mutex<mpsc::Receiver<bool>>> = OnceLock::new();
    LINES.get_or_init(|| Mutex::new(spawn_line_reader(BufReader::new(std::io::stdin()))))
}

/// Block until a line is read from stdin or `timeout` elapses.
fn wait_for_enter(timeout: Duration) -> bool {
    stdin_lines()
        .lock()
        .is_ok_and(|lines| matches!(lines.recv_timeout(timeout), Ok(true)))
}

fn action_error(action: &str, reason: impl ToString) -> BrowserError {
    BrowserError::Action {
        action: action.to_string(),
        reason: reason.to_string(),
    }
}

/// A signed-in Chrome session on the target repository.
///
/// Dropping the session closes the browser.
#[derive(Debug)]
pub struct BrowserSession {
    runtime: tokio::runtime::Runtime,
    browser: Option<Browser>,
    page: Page,
    server_url: String,
    repo: RepoRef,
}

impl BrowserSession {
    /// Launch Chrome, open the repository page, and wait for the operator to
    /// sign in if GitHub shows a "Sign in" control.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] if Chrome cannot start, the page cannot be
    /// loaded, or the operator does not sign in within [`LOGIN_TIMEOUT`].
    pub fn open(
        server_url: &str,
        repo: &RepoRef,
        headless: bool,
        log: &dyn Log,
    ) -> Result<Self, BrowserError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let mut builder = BrowserConfig::builder()
            .arg("--no-first-run")
            .arg("--disable-dev-shm-usage");
        if !headless {
            builder = builder.with_head();
        }
        if let Some(chrome) = find_chrome() {
            log.debug(&format!("using Chrome at {}", chrome.display()));
            builder = builder.chrome_executable(chrome);
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, page) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| BrowserError::Launch(e.to_string()))?;
            tokio::spawn(async move { while handler.next().await.is_some() {} });
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| BrowserError::Launch(e.to_string()))?;
            Ok::<_, BrowserError>((browser, page))
        })?;

        let session = Self {
            runtime,
            browser: Some(browser),
            page,
            server_url: server_url.trim_end_matches('/').to_string(),
            repo: repo.clone(),
        };

        session.visit("")?;
        if scrape::has_sign_in(&session.html()?)? {
            log.warn(
                "GitHub sign in detected. Please log in in Chrome, then press ENTER here within 5 minutes.",
            );
            if !wait_for_enter(LOGIN_TIMEOUT) {
                return Err(BrowserError::LoginTimeout {
                    minutes: LOGIN_TIMEOUT.as_secs() / 60,
                });
            }
            session.visit("")?;
            if scrape::has_sign_in(&session.html()?)? {
                return Err(BrowserError::StillSignedOut);
            }
        }
        log.debug("browser session ready");
        Ok(session)
    }

    /// Repository being edited.
    #[must_use]
    pub const fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Navigate to `{server}/{owner}/{name}{suffix}` and let it settle.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Action`] if navigation fails.
    pub fn visit(&self, suffix: &str) -> Result<(), BrowserError> {
        let url = format!("{}/{}{suffix}", self.server_url, self.repo);
        self.runtime.block_on(async {
            self.page
                .goto(url.as_str())
                .await
                .map_err(|e| action_error(&format!("open {url}"), e))?;
            let _ = tokio::time::timeout(SETTLE, self.page.wait_for_navigation()).await;
            Ok(())
        })
    }

    /// Let a submitted form navigate; a missing navigation is not an error.
    pub fn settle(&self) {
        self.runtime.block_on(async {
            let _ = tokio::time::timeout(SETTLE, self.page.wait_for_navigation()).await;
        });
    }

    /// Current page HTML.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Action`] if the content cannot be read.
    pub fn html(&self) -> Result<String, BrowserError> {
        self.runtime
            .block_on(self.page.content())
            .map_err(|e| action_error("read page", e))
    }

    /// Evaluate `script` and expect it to return `true`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Action`] naming `action` if evaluation fails or
    /// the script returns anything but `true` (e.g. an element is missing).
    pub fn run(&self, action: &str, script: &str) -> Result<(), BrowserError> {
        let done = self.runtime.block_on(async {
            self.page
                .evaluate(script.to_string())
                .await
                .map_err(|e| action_error(action, e))?
                .into_value::<bool>()
                .map_err(|e| action_error(action, e))
        })?;
        if done {
            Ok(())
        } else {
            Err(action_error(action, "element not found"))
        }
    }

    /// Close the browser.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            self.runtime.block_on(async {
                let _ = browser.close().await;
                let _ = browser.wait().await;
            });
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Script that sets an input's value and fires `input`/`change`.
#[must_use]
pub(crate) fn fill_script(css: &str, value: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); if (!el) return false; el.value = {}; \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
        js(css),
        js(value)
    )
}

/// Script that checks a radio button or checkbox.
#[must_use]
pub(crate) fn check_script(css: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); if (!el) return false; \
         el.checked = true; el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
        js(css)
    )
}

/// Script that clicks the first element matching `css` (inside the first
/// match of `scope`, if given) whose text contains `text`, if given.
#[must_use]
pub(crate) fn click_script(scope: Option<&str>, css: &str, text: Option<&str>) -> String {
    let root = scope.map_or_else(
        || "document".to_string(),
        |s| format!("document.querySelector({})", js(s)),
    );
    let filter = text.map_or_else(
        || "true".to_string(),
        |t| format!("el.textContent.includes({})", js(t)),
    );
    format!(
        "(() => {{ const root = {root}; if (!root) return false; \
         const el = Array.from(root.querySelectorAll({})).find((el) => {filter}); \
         if (!el) return false; el.click(); return true; }})()",
        js(css)
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn js_escapes_quotes_and_backslashes() {
        assert_eq!(js(r"#category\[name\]"), r##""#category\\[name\\]""##);
        assert_eq!(js(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn line_reader_reports_each_line_then_stops() {
        let lines = spawn_line_reader(std::io::Cursor::new("first\nsecond\n"));
        assert_eq!(lines.iter().collect::<Vec<_>>(), vec![true, true, true]);
    }

    #[test]
    fn line_reader_stops_after_a_read_error() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("gone"))
            }
        }
        let lines = spawn_line_reader(BufReader::new(Broken));
        assert_eq!(lines.iter().collect::<Vec<_>>(), vec![false]);
    }

    #[test]
    fn fill_script_embeds_literals() {
        let script = fill_script("#a", "it's");
        assert!(script.contains(r##"document.querySelector("#a")"##));
        assert!(script.contains(r#"el.value = "it's";"#));
    }

    #[test]
    fn click_script_scopes_and_filters() {
        let script = click_script(Some("form"), "button", Some("Pin"));
        assert!(script.contains(r#"const root = document.querySelector("form");"#));
        assert!(script.contains(r#"el.textContent.includes("Pin")"#));
        assert!(click_script(None, "button", None).contains("const root = document;"));
    }

    #[test]
    #[allow(unsafe_code)]
    fn chrome_env_override() {
        let _guard = crate::logging::TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = std::env::var_os("CHROME");
        // SAFETY: serialised by TEST_ENV_MUTEX.
        unsafe { std::env::set_var("CHROME", "/opt/chrome/chrome") };
        let found = find_chrome();
        match previous {
            // SAFETY: serialised by TEST_ENV_MUTEX.
            Some(value) => unsafe { std::env::set_var("CHROME", value) },
            // SAFETY: serialised by TEST_ENV_MUTEX.
            None => unsafe { std::env::remove_var("CHROME") },
        }
        assert_eq!(found, Some(PathBuf::from("/opt/chrome/chrome")));
    }
}

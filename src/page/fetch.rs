//! Background fragment fetching.
//!
//! Page fragments come from the site directory or, with the `gui` feature,
//! from `http(s)://` URLs. Every fetch runs on its own short-lived thread,
//! so a slow or hung source never delays a newer load and never stalls the
//! frame loop; the frame loop drains results with [`FragmentFetcher::poll`].

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};

use super::loader::LoadRequest;
use super::token::LoadToken;
use crate::error::VitrineError;

/// Upper bound on one remote fetch, connect to last byte.
pub const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// A finished fetch.
#[derive(Debug)]
pub struct FetchResult {
    /// Token of the load that asked for it.
    pub token: LoadToken,
    /// URL as requested.
    pub url: String,
    /// Fragment markup or the failure.
    pub result: Result<String, VitrineError>,
}

/// Runs fragment fetches concurrently, one thread per request.
///
/// Fetch threads are detached: dropping the fetcher never waits on one.
/// Their results are discarded once the fetcher is gone.
pub struct FragmentFetcher {
    site_root: Arc<Path>,
    result_tx: mpsc::Sender<FetchResult>,
    result_rx: mpsc::Receiver<FetchResult>,
}

impl FragmentFetcher {
    /// Create a fetcher. Relative URLs resolve against `site_root`.
    #[must_use]
    pub fn new(site_root: PathBuf) -> Self {
        let (result_tx, result_rx) = mpsc::channel::<FetchResult>();
        Self {
            site_root: Arc::from(site_root),
            result_tx,
            result_rx,
        }
    }

    /// Start a fetch (non-blocking).
    ///
    /// If the thread cannot be spawned the failure is delivered through
    /// [`poll`](Self::poll) like any other fetch error.
    pub fn submit(&self, request: LoadRequest) {
        let LoadRequest { token, url } = request;
        let site_root = Arc::clone(&self.site_root);
        let result_tx = self.result_tx.clone();
        let thread_url = url.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("fragment-fetch-{token}"))
            .spawn(move || {
                let result = fetch_fragment(&site_root, &thread_url);
                let _ = result_tx.send(FetchResult {
                    token,
                    url: thread_url,
                    result,
                });
            });
        if let Err(e) = spawned {
            let _ = self.result_tx.send(FetchResult {
                token,
                url,
                result: Err(VitrineError::ThreadSpawn(e)),
            });
        }
    }

    /// Next finished fetch, if any (non-blocking).
    pub fn poll(&self) -> Option<FetchResult> {
        self.result_rx.try_recv().ok()
    }
}

/// Whether `url` names a remote resource rather than a site file.
#[must_use]
pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Blocking fetch of one fragment.
///
/// # Errors
///
/// Returns [`VitrineError::FragmentFetch`] when the file cannot be read,
/// the request fails, or remote fetching is not compiled in.
pub fn fetch_fragment(site_root: &Path, url: &str) -> Result<String, VitrineError> {
    if is_remote(url) {
        return fetch_remote(url);
    }
    let path = resolve_site_path(site_root, url);
    std::fs::read_to_string(&path).map_err(|e| VitrineError::fetch(url, e))
}

/// Map a site-relative URL to a file under `site_root`.
///
/// Query strings and fragments are dropped and a leading `/` or `./` is
/// treated as the site root.
#[must_use]
pub fn resolve_site_path(site_root: &Path, url: &str) -> PathBuf {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_start_matches("./").trim_start_matches('/');
    site_root.join(path)
}

#[cfg(feature = "gui")]
fn fetch_remote(url: &str) -> Result<String, VitrineError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(FETCH_TIMEOUT))
        .build()
        .into();
    agent
        .get(url)
        .call()
        .map_err(|e| VitrineError::fetch(url, e))?
        .into_body()
        .read_to_string()
        .map_err(|e| VitrineError::fetch(url, e))
}

#[cfg(not(feature = "gui"))]
fn fetch_remote(url: &str) -> Result<String, VitrineError> {
    Err(VitrineError::fetch(
        url,
        "remote pages need the `gui` feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::token::LoadTokenSource;

    fn site_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("vitrine_fetch_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn site_paths_resolve_under_root() {
        let root = Path::new("/srv/site");
        assert_eq!(
            resolve_site_path(root, "page1.html"),
            root.join("page1.html")
        );
        assert_eq!(
            resolve_site_path(root, "./pages/a.html?x=1#top"),
            root.join("pages/a.html")
        );
        assert_eq!(resolve_site_path(root, "/b.html"), root.join("b.html"));
        assert!(is_remote("https://example.com/p.html"));
        assert!(!is_remote("page1.html"));
    }

    #[test]
    fn reads_local_fragment() {
        let dir = site_dir("local");
        std::fs::write(dir.join("page1.html"), "<div>one</div>").unwrap();
        assert_eq!(
            fetch_fragment(&dir, "page1.html").unwrap(),
            "<div>one</div>"
        );
        let err = fetch_fragment(&dir, "nope.html").unwrap_err();
        assert!(matches!(err, VitrineError::FragmentFetch { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn worker_returns_results_with_their_token() {
        let dir = site_dir("worker");
        std::fs::write(dir.join("a.html"), "A").unwrap();
        let fetcher = FragmentFetcher::new(dir.clone());
        let mut tokens = LoadTokenSource::default();
        let token = tokens.issue();
        fetcher.submit(LoadRequest {
            token,
            url: "a.html".into(),
        });

        let result = wait_for(&fetcher, 2000).unwrap();
        assert_eq!(result.token, token);
        assert_eq!(result.result.unwrap(), "A");
        let _ = std::fs::remove_dir_all(&dir);
    }

    fn wait_for(fetcher: &FragmentFetcher, millis: u64) -> Option<FetchResult> {
        for _ in 0..millis / 10 {
            if let Some(result) = fetcher.poll() {
                return Some(result);
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        None
    }

    #[cfg(unix)]
    #[test]
    fn blocked_fetch_does_not_hold_back_newer_loads() {
        let dir = site_dir("blocked");
        std::fs::write(dir.join("b.html"), "B").unwrap();
        // A FIFO with no writer: reading it blocks until one shows up.
        let fifo = dir.join("slow.html");
        let _ = std::fs::remove_file(&fifo);
        let made = std::process::Command::new("mkfifo").arg(&fifo).status();
        if !made.is_ok_and(|status| status.success()) {
            let _ = std::fs::remove_dir_all(&dir);
            return;
        }

        let fetcher = FragmentFetcher::new(dir.clone());
        let mut tokens = LoadTokenSource::default();
        let slow = tokens.issue();
        let newest = tokens.issue();
        fetcher.submit(LoadRequest {
            token: slow,
            url: "slow.html".into(),
        });
        fetcher.submit(LoadRequest {
            token: newest,
            url: "b.html".into(),
        });

        let result = wait_for(&fetcher, 2000).unwrap();
        assert_eq!(result.token, newest);
        assert_eq!(result.result.unwrap(), "B");

        // Dropping the fetcher must not wait for the blocked read.
        drop(fetcher);

        // Unblock the reader so the thread can exit.
        let _ = std::fs::OpenOptions::new().write(true).open(&fifo);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

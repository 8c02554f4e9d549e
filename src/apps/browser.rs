// Nexus Browser: address bar resolution and navigation history.
// Page content itself is rendered by the host in an isolated frame.

use reqwest::Url;
use serde::Serialize;

pub const HOME_URL: &str = "https://www.google.com/search?igu=1";
const HOME_ADDRESS: &str = "google.com";
const SEARCH_URL: &str = "https://www.google.com/search";

/// Turn address bar text into a URL.
///
/// * An absolute `http`/`https` URL is taken as is
/// * A bare domain (contains a dot, no spaces) gets `https://`
/// * Everything else becomes a search
pub fn resolve_address(input: &str) -> String {
    let input = input.trim();
    if has_web_scheme(input) {
        return input.to_string();
    }
    if input.contains('.') && !input.contains(' ') {
        return format!("https://{}", input);
    }
    search_url(input)
}

fn has_web_scheme(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn search_url(query: &str) -> String {
    match Url::parse_with_params(SEARCH_URL, &[("q", query), ("igu", "1")]) {
        Ok(url) => url.to_string(),
        Err(_) => HOME_URL.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowserState {
    url: String,
    address: String,
    history: Vec<String>,
    cursor: usize,
    show_notice: bool,
}

impl BrowserState {
    pub fn new() -> Self {
        Self {
            url: HOME_URL.to_string(),
            address: HOME_ADDRESS.to_string(),
            history: vec![HOME_URL.to_string()],
            cursor: 0,
            show_notice: true,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn show_notice(&self) -> bool {
        self.show_notice
    }

    /// Navigate from the address bar. Drops any forward history.
    pub fn navigate(&mut self, input: &str) -> &str {
        let url = resolve_address(input);
        self.address = input.to_string();
        self.history.truncate(self.cursor + 1);
        self.history.push(url.clone());
        self.cursor = self.history.len() - 1;
        self.url = url;
        &self.url
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn back(&mut self) -> &str {
        if self.can_go_back() {
            self.cursor -= 1;
            self.url = self.history[self.cursor].clone();
        }
        &self.url
    }

    pub fn home(&mut self) -> &str {
        self.navigate(HOME_URL)
    }

    pub fn dismiss_notice(&mut self) {
        self.show_notice = false;
    }
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new()
    }
}

use std::ffi::OsStr;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::Rng;
use tracing::debug;

/// The handful of browser operations the job board workflows need.
/// Elements are addressed by CSS selector.
pub trait AutomationDriver {
    fn navigate(&self, url: &str) -> Result<()>;

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    fn click(&self, selector: &str) -> Result<()>;

    /// Clicks the `index`-th match of `selector`.
    fn click_nth(&self, selector: &str, index: usize) -> Result<()>;

    fn type_into(&self, selector: &str, text: &str) -> Result<()>;

    /// Inner text of every match, in document order. No match is not an error.
    fn inner_texts(&self, selector: &str) -> Result<Vec<String>>;

    fn is_checked(&self, selector: &str) -> Result<bool>;

    fn upload_file(&self, selector: &str, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: (1920, 1080),
        }
    }
}

/// Chrome over the DevTools protocol.
pub struct ChromeDriver {
    // keeps the browser process alive for as long as the tab is used
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(options: &BrowserOptions) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(options.headless)
            .window_size(Some(options.window_size))
            .args(vec![
                OsStr::new("--start-maximized"),
                OsStr::new("--disable-notifications"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-gpu"),
            ])
            .build()
            .map_err(|e| anyhow!("Invalid browser launch options: {e}"))?;

        let browser = Browser::new(launch_options).context("Failed to launch Chrome")?;
        let tab = browser.new_tab().context("Failed to open a browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn close(self) {
        let _ = self.tab.close_target();
    }
}

impl AutomationDriver for ChromeDriver {
    fn navigate(&self, url: &str) -> Result<()> {
        debug!("Opening: {}", url);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Navigation to {url} failed"))?
            .wait_until_navigated()?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .with_context(|| format!("Timed out waiting for '{selector}'"))?;
        Ok(())
    }

    fn click(&self, selector: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .with_context(|| format!("No element matches '{selector}'"))?
            .click()?;
        Ok(())
    }

    fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        let elements = self.tab.find_elements(selector)?;
        let element = elements
            .get(index)
            .ok_or_else(|| anyhow!("Only {} matches for '{selector}'", elements.len()))?;
        element.click()?;
        Ok(())
    }

    fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .with_context(|| format!("No element matches '{selector}'"))?
            .type_into(text)?;
        Ok(())
    }

    fn inner_texts(&self, selector: &str) -> Result<Vec<String>> {
        // find_elements errors when nothing matches
        let Ok(elements) = self.tab.find_elements(selector) else {
            return Ok(Vec::new());
        };
        elements.iter().map(|e| e.get_inner_text()).collect()
    }

    fn is_checked(&self, selector: &str) -> Result<bool> {
        let checked = self
            .tab
            .find_element(selector)?
            .call_js_fn("function() { return this.checked === true; }", vec![], false)?
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(checked)
    }

    fn upload_file(&self, selector: &str, path: &Path) -> Result<()> {
        let path = path
            .to_str()
            .ok_or_else(|| anyhow!("Resume path is not valid UTF-8: {}", path.display()))?;
        self.tab
            .find_element(selector)
            .with_context(|| format!("No file input matches '{selector}'"))?
            .set_input_files(&[path])?;
        Ok(())
    }
}

/// Random pause between actions so the page has time to settle.
#[derive(Debug, Clone)]
pub struct Pacing {
    range_ms: Option<RangeInclusive<u64>>,
}

impl Pacing {
    pub fn between(min_ms: u64, max_ms: u64) -> Self {
        let (lo, hi) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            range_ms: Some(lo..=hi),
        }
    }

    pub fn none() -> Self {
        Self { range_ms: None }
    }

    pub fn next_delay(&self) -> Duration {
        match &self.range_ms {
            Some(range) => Duration::from_millis(rand::thread_rng().gen_range(range.clone())),
            None => Duration::ZERO,
        }
    }

    pub fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::between(2000, 4000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_stays_in_range() {
        let pacing = Pacing::between(100, 250);
        for _ in 0..100 {
            let delay = pacing.next_delay().as_millis();
            assert!((100..=250).contains(&delay), "{delay}");
        }
    }

    #[test]
    fn pacing_accepts_reversed_bounds() {
        let pacing = Pacing::between(300, 200);
        let delay = pacing.next_delay().as_millis();
        assert!((200..=300).contains(&delay));
    }

    #[test]
    fn no_pacing_is_instant() {
        assert_eq!(Pacing::none().next_delay(), Duration::ZERO);
    }
}

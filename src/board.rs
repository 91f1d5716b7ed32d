//! Login, search and Easy Apply workflows on top of an [`AutomationDriver`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::driver::{AutomationDriver, Pacing};
use crate::search::SearchUrl;

const LOGIN_URL: &str = "https://www.linkedin.com/login";
const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const DEFAULT_MAX_PAGES: usize = 10;

/// CSS selectors for the pages we drive. The site changes its markup
/// without notice, so all of them can be overridden from the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub username_input: String,
    pub password_input: String,
    pub remember_me: String,
    pub login_submit: String,
    pub job_card: String,
    pub next_page: String,
    pub easy_apply_button: String,
    pub resume_upload: String,
    pub submit_application: String,
    pub confirmation: String,
    pub dismiss_modal: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            username_input: "#username".into(),
            password_input: "#password".into(),
            remember_me: "input#remember-me".into(),
            login_submit: "button[type='submit']".into(),
            job_card: ".job-card-container".into(),
            next_page: ".jobs-search-pagination__button--next".into(),
            easy_apply_button: ".jobs-apply-button".into(),
            resume_upload: "input[type='file']".into(),
            submit_application: "button.artdeco-button--primary".into(),
            confirmation: ".artdeco-inline-feedback--success".into(),
            dismiss_modal: ".artdeco-modal__dismiss".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    /// 1-based results page the card was read from.
    pub page: usize,
    /// Position among the job card elements of that page, blank cards included.
    pub card_index: usize,
}

impl JobListing {
    /// Cards render the title on the first line and the company on the second.
    pub fn from_card(page: usize, card_index: usize, text: &str) -> Option<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines.next()?.to_string();
        let company = lines.next().unwrap_or(UNKNOWN_COMPANY).to_string();
        Some(Self {
            title,
            company,
            page,
            card_index,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    /// Whatever resume the profile already has.
    Existing,
    Upload(PathBuf),
}

/// What we can tell about an application after clicking submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A confirmation element appeared.
    Confirmed,
    /// Submitted, but no confirmation was observed.
    Unconfirmed,
    Failed(String),
}

impl ApplyOutcome {
    pub fn submitted(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

pub struct JobBoard<D> {
    driver: D,
    selectors: Selectors,
    pacing: Pacing,
    wait: Duration,
    confirmation_wait: Duration,
    max_pages: usize,
}

impl<D: AutomationDriver> JobBoard<D> {
    pub fn new(driver: D, selectors: Selectors) -> Self {
        Self {
            driver,
            selectors,
            pacing: Pacing::default(),
            wait: Duration::from_secs(10),
            confirmation_wait: Duration::from_secs(5),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        let s = &self.selectors;
        self.driver.navigate(LOGIN_URL)?;
        self.pacing.pause();

        self.driver
            .wait_for(&s.username_input, self.wait)
            .context("Login form did not load")?;
        self.driver.type_into(&s.username_input, username)?;
        self.pacing.pause();
        self.driver.type_into(&s.password_input, password)?;
        self.pacing.pause();

        match self.driver.is_checked(&s.remember_me) {
            Ok(true) => {
                self.driver.click(&s.remember_me)?;
                info!("Unchecked 'Remember Me' option.");
            }
            Ok(false) => {}
            Err(e) => info!("'Remember Me' option not found or could not be unchecked: {e}"),
        }

        self.driver.click(&s.login_submit)?;
        info!("Submitted LinkedIn login form.");
        Ok(())
    }

    pub fn open(&self, url: &SearchUrl) -> Result<()> {
        self.driver.navigate(url.as_str())?;
        self.pacing.pause();
        Ok(())
    }

    /// Collects up to `limit` listings (all of them when `None`), following
    /// the next-page button for at most `max_pages` pages.
    pub fn search(&self, url: &SearchUrl, limit: Option<usize>) -> Result<Vec<JobListing>> {
        self.open(url)?;

        let mut jobs = Vec::new();
        self.collect_page(1, &mut jobs, limit)?;

        for page in 2..=self.max_pages {
            if limit.is_some_and(|l| jobs.len() >= l) {
                break;
            }
            if let Err(e) = self.driver.click(&self.selectors.next_page) {
                info!("No more pages or pagination error occurred: {e}");
                break;
            }
            self.pacing.pause();

            let before = jobs.len();
            if let Err(e) = self.collect_page(page, &mut jobs, limit) {
                warn!("Failed to read results page {page}: {e:#}");
                break;
            }
            if jobs.len() == before {
                break;
            }
        }

        Ok(jobs)
    }

    fn collect_page(
        &self,
        page: usize,
        jobs: &mut Vec<JobListing>,
        limit: Option<usize>,
    ) -> Result<()> {
        let cards = self.driver.inner_texts(&self.selectors.job_card)?;
        for (card_index, card) in cards.iter().enumerate() {
            if limit.is_some_and(|l| jobs.len() >= l) {
                break;
            }
            if let Some(listing) = JobListing::from_card(page, card_index, card) {
                jobs.push(listing);
            }
        }
        Ok(())
    }

    /// Walks one Easy Apply dialog for `listing`. Expects the first results
    /// page to be open, so listings read from later pages are refused.
    pub fn apply(&self, listing: &JobListing, resume: &Resume) -> ApplyOutcome {
        if listing.page != 1 {
            let reason = format!("listed on results page {}", listing.page);
            warn!(
                "Could not complete Easy Apply for job: {}. Reason: {}",
                listing.title, reason
            );
            return ApplyOutcome::Failed(reason);
        }

        if let Err(e) = self.submit_application(listing.card_index, resume) {
            warn!(
                "Could not complete Easy Apply for job: {}. Reason: {:#}",
                listing.title, e
            );
            return ApplyOutcome::Failed(format!("{e:#}"));
        }

        let s = &self.selectors;
        let outcome = match self.driver.wait_for(&s.confirmation, self.confirmation_wait) {
            Ok(()) => ApplyOutcome::Confirmed,
            Err(_) => {
                warn!(
                    "Could not confirm application success for {} at {}.",
                    listing.title, listing.company
                );
                ApplyOutcome::Unconfirmed
            }
        };

        match self.driver.click(&s.dismiss_modal) {
            Ok(()) => info!("Closed the application modal."),
            Err(e) => warn!("Could not close application modal: {e}"),
        }

        outcome
    }

    fn submit_application(&self, index: usize, resume: &Resume) -> Result<()> {
        let s = &self.selectors;

        self.driver
            .click_nth(&s.job_card, index)
            .context("Could not open job details")?;
        self.pacing.pause();

        self.driver.wait_for(&s.easy_apply_button, self.wait)?;
        self.driver.click(&s.easy_apply_button)?;
        info!("Clicked 'Easy Apply' button.");

        if let Resume::Upload(path) = resume {
            self.driver.wait_for(&s.resume_upload, self.wait)?;
            self.driver.upload_file(&s.resume_upload, path)?;
            info!("Uploaded custom resume.");
        }

        self.driver.wait_for(&s.submit_application, self.wait)?;
        self.driver.click(&s.submit_application)?;
        info!("Submitted the application.");
        Ok(())
    }
}

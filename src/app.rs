use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::board::{JobBoard, JobListing, Resume};
use crate::driver::AutomationDriver;
use crate::events::{Event, EventSink};
use crate::geocode::Geocoder;
use crate::prompt::Prompter;
use crate::search::{SearchParameterResolver, SearchRequest};
use crate::settings::{Settings, SettingsStore};

/// Asks for whatever half of the login is missing and persists it.
pub fn ensure_credentials<R: BufRead, W: Write>(
    settings: &mut Settings,
    store: &dyn SettingsStore,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    if settings.has_credentials() {
        return Ok(());
    }

    settings.username = prompter.ask("Enter your LinkedIn Username: ")?;
    settings.password = prompter.ask("Enter your LinkedIn Password: ")?;
    store.save(settings)
}

pub struct Session<D, G> {
    board: JobBoard<D>,
    resolver: SearchParameterResolver<G>,
    store: Box<dyn SettingsStore>,
    settings: Settings,
    sink: Arc<dyn EventSink>,
}

impl<D: AutomationDriver, G: Geocoder> Session<D, G> {
    pub fn new(
        board: JobBoard<D>,
        resolver: SearchParameterResolver<G>,
        store: Box<dyn SettingsStore>,
        settings: Settings,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            board,
            resolver,
            store,
            settings,
            sink,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_board(self) -> JobBoard<D> {
        self.board
    }

    /// Reports the result through the event sink. The session goes on either way.
    pub fn login(&self) -> bool {
        match self
            .board
            .login(&self.settings.username, &self.settings.password)
        {
            Ok(()) => {
                self.sink.emit(&Event::LoggedIn);
                true
            }
            Err(e) => {
                self.sink.emit(&Event::Failure {
                    context: "LinkedIn login".into(),
                    message: format!("{e:#}"),
                });
                false
            }
        }
    }

    pub async fn run<R: BufRead, W: Write>(&mut self, prompter: &mut Prompter<R, W>) -> Result<()> {
        loop {
            let request = self.ask_search(prompter)?;
            let url = self.resolver.build_request_url(&request).await;

            prompter.say(format!(
                "Searching for jobs with keyword '{}' in '{}', job type: {}.",
                request.keyword(),
                request.location(),
                request.job_type()
            ))?;
            self.sink.emit(&Event::SearchStarted {
                url: url.to_string(),
            });

            let limit = prompter
                .ask_limit("Enter the number of roles to display (or press Enter to display all): ")?;
            let jobs = match self.board.search(&url, limit) {
                Ok(jobs) => jobs,
                Err(e) => {
                    self.sink.emit(&Event::Failure {
                        context: "job search".into(),
                        message: format!("{e:#}"),
                    });
                    Vec::new()
                }
            };

            if !jobs.is_empty() {
                self.sink.emit(&Event::JobsFound { count: jobs.len() });
                for (i, job) in jobs.iter().enumerate() {
                    let note = if self.settings.has_applied_to(&job.company) {
                        " (applied before)"
                    } else {
                        ""
                    };
                    prompter.say(format!("{}. {} at {}{note}", i + 1, job.title, job.company))?;
                }

                let apply_all =
                    prompter.confirm("Do you want to apply to all jobs automatically?")?;
                let Some(resume) = self.ask_resume(prompter)? else {
                    prompter.say("Invalid file path. Exiting.")?;
                    return Ok(());
                };

                // listings point at cards on the first results page
                match self.board.open(&url) {
                    Ok(()) => self.apply_round(prompter, &jobs, &resume, apply_all)?,
                    Err(e) => self.sink.emit(&Event::Failure {
                        context: "job application".into(),
                        message: format!("{e:#}"),
                    }),
                }
            }

            if !prompter.confirm("Do you want to perform another search?")? {
                return Ok(());
            }
        }
    }

    fn ask_search<R: BufRead, W: Write>(
        &mut self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<SearchRequest> {
        let keyword = prompter.ask_or("Enter job search keyword", &self.settings.keyword)?;
        let location = prompter.ask_or("Enter job location", &self.settings.location)?;
        let easy_apply = prompter.confirm("Apply Easy Apply filter?")?;
        let job_type = prompter.ask_or(
            "Enter job type (remote/hybrid/onsite)",
            &self.settings.job_type,
        )?;

        let request = SearchRequest::new(keyword, location, easy_apply, &job_type);

        self.settings.keyword = request.keyword().to_string();
        self.settings.location = request.location().to_string();
        self.settings.easy_apply = easy_apply;
        self.settings.job_type = request.job_type().to_string();
        self.store.save(&self.settings)?;

        Ok(request)
    }

    /// `None` when the user points at a resume that does not exist.
    fn ask_resume<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<Option<Resume>> {
        if prompter.confirm("Use existing resume on LinkedIn?")? {
            return Ok(Some(Resume::Existing));
        }

        let path = PathBuf::from(prompter.ask("Enter the path to your PDF resume: ")?);
        if path.is_file() {
            Ok(Some(Resume::Upload(path)))
        } else {
            Ok(None)
        }
    }

    fn apply_round<R: BufRead, W: Write>(
        &mut self,
        prompter: &mut Prompter<R, W>,
        jobs: &[JobListing],
        resume: &Resume,
        apply_all: bool,
    ) -> Result<()> {
        let mut submitted = Vec::new();

        for job in jobs {
            let wanted = if apply_all {
                !self.settings.has_applied_to(&job.company)
            } else {
                prompter.say(format!("\nJob: {} at {}", job.title, job.company))?;
                prompter.confirm("Do you want to apply for this job?")?
            };

            if !wanted {
                self.sink.emit(&Event::ApplicationSkipped {
                    title: job.title.clone(),
                    company: job.company.clone(),
                });
                continue;
            }

            self.sink.emit(&Event::ApplicationStarted {
                title: job.title.clone(),
                company: job.company.clone(),
            });
            let outcome = self.board.apply(job, resume);
            if outcome.submitted() {
                self.settings.record_application(&job.company);
                submitted.push(job);
            }
            self.sink.emit(&Event::Applied {
                title: job.title.clone(),
                company: job.company.clone(),
                outcome,
            });
        }

        if submitted.is_empty() {
            prompter.say("\nNo applications were successfully submitted.")?;
            return Ok(());
        }

        self.store.save(&self.settings)?;
        prompter.say("\nSubmitted applications for the following jobs:")?;
        for job in submitted {
            prompter.say(format!("- {} at {}", job.title, job.company))?;
            info!("Applied to: {} at {}", job.title, job.company);
        }
        Ok(())
    }
}

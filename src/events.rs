use std::fmt;

use tracing::{error, info, warn};

use crate::board::ApplyOutcome;

/// Things worth telling the user or the activity log about.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LocationDetected { query: String, address: String },
    LoggedIn,
    SearchStarted { url: String },
    JobsFound { count: usize },
    ApplicationStarted { title: String, company: String },
    Applied {
        title: String,
        company: String,
        outcome: ApplyOutcome,
    },
    ApplicationSkipped { title: String, company: String },
    Failure { context: String, message: String },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::LocationDetected { address, .. } => write!(f, "Detected location: {address}"),
            Event::LoggedIn => write!(f, "Login successful!"),
            Event::SearchStarted { url } => write!(f, "Navigated to job search URL: {url}"),
            Event::JobsFound { count } => write!(f, "Total jobs found: {count}"),
            Event::ApplicationStarted { title, company } => {
                write!(f, "Attempting to apply for job: {title} at {company}")
            }
            Event::Applied {
                title,
                company,
                outcome,
            } => match outcome {
                ApplyOutcome::Confirmed => {
                    write!(f, "Application for {title} at {company} was successful.")
                }
                ApplyOutcome::Unconfirmed => write!(
                    f,
                    "Submitted {title} at {company}, but could not confirm application success."
                ),
                ApplyOutcome::Failed(reason) => write!(
                    f,
                    "Could not complete Easy Apply for job: {title}. Reason: {reason}"
                ),
            },
            Event::ApplicationSkipped { title, company } => {
                write!(f, "Skipped application for job: {title} at {company}")
            }
            Event::Failure { context, message } => write!(f, "Error during {context}: {message}"),
        }
    }
}

/// Receives events in place of ambient logging/notification globals.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &Event);
}

/// Writes every event to the activity log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        match event {
            Event::Failure { .. } => error!("{event}"),
            Event::Applied {
                outcome: ApplyOutcome::Confirmed,
                ..
            } => info!("{event}"),
            Event::Applied { .. } => warn!("{event}"),
            _ => info!("{event}"),
        }
    }
}

/// Prints user-facing events to stdout and forwards everything to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink {
    log: TracingSink,
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &Event) {
        self.log.emit(event);
        match event {
            // log-only
            Event::SearchStarted { .. } | Event::ApplicationSkipped { .. } => {}
            Event::Failure { .. } => println!("❌ {event}"),
            Event::Applied {
                outcome: ApplyOutcome::Confirmed,
                ..
            } => println!("✅ {event}"),
            Event::Applied { .. } => println!("⚠️  {event}"),
            _ => println!("{event}"),
        }
    }
}

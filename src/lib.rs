pub mod app;
pub mod board;
pub mod cli;
pub mod driver;
pub mod events;
pub mod geocode;
pub mod prompt;
pub mod search;
pub mod settings;

pub use app::{ensure_credentials, Session};
pub use board::{ApplyOutcome, JobBoard, JobListing, Resume, Selectors};
pub use driver::{AutomationDriver, BrowserOptions, ChromeDriver, Pacing};
pub use events::{ConsoleSink, Event, EventSink, TracingSink};
pub use geocode::{GeoPlace, Geocoder, NoGeocoder, NominatimGeocoder};
pub use prompt::Prompter;
pub use search::{GeoId, JobType, SearchParameterResolver, SearchRequest, SearchUrl};
pub use settings::{JsonSettingsStore, Settings, SettingsStore};

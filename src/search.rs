//! Turns what the user typed into job-search query parameters.
//!
//! Both lookups are total: unknown job types fall back to remote work and
//! unknown locations fall back to the worldwide scope.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::events::{Event, EventSink};
use crate::geocode::Geocoder;

const SEARCH_ENDPOINT: &str = "https://www.linkedin.com/jobs/search/";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Work arrangement filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobType {
    #[default]
    Remote,
    Hybrid,
    Onsite,
}

impl JobType {
    pub fn from_input(input: &str) -> Self {
        match input.to_lowercase().as_str() {
            "hybrid" => Self::Hybrid,
            "onsite" => Self::Onsite,
            _ => Self::Remote,
        }
    }

    /// Provider code for the `f_WT` parameter.
    pub fn filter_code(&self) -> u8 {
        match self {
            Self::Hybrid => 3,
            Self::Remote => 2,
            Self::Onsite => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Hybrid => "hybrid",
            Self::Onsite => "onsite",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider geographic identifier (`geoId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoId(&'static str);

impl GeoId {
    pub const WORLDWIDE: GeoId = GeoId("92000000");

    /// Exact match against the known location names. `name` must already be
    /// lower case.
    pub fn known(name: &str) -> Option<GeoId> {
        let id = match name {
            "indonesia" => "102478259",
            "worldwide" => "92000000",
            "united states" => "103644278",
            "canada" => "101174742",
            "united kingdom" => "101165590",
            "australia" => "101452733",
            "germany" => "101282230",
            "france" => "101292050",
            "india" => "102713980",
            "malaysia" => "101218837",
            _ => return None,
        };
        Some(GeoId(id))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One search as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    keyword: String,
    location: String,
    easy_apply: bool,
    job_type: JobType,
}

impl SearchRequest {
    pub fn new(
        keyword: impl Into<String>,
        location: impl Into<String>,
        easy_apply: bool,
        job_type: &str,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
            easy_apply,
            job_type: JobType::from_input(job_type),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn easy_apply(&self) -> bool {
        self.easy_apply
    }

    pub fn job_type(&self) -> JobType {
        self.job_type
    }
}

/// Fully formed search results URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUrl(String);

impl SearchUrl {
    pub fn new(keyword: &str, job_type: JobType, geo_id: GeoId, easy_apply: bool) -> Self {
        let easy_apply_flag = if easy_apply { "true" } else { "false" };
        Self(format!(
            "{SEARCH_ENDPOINT}?f_AL={easy_apply_flag}&f_WT={}&geoId={geo_id}&keywords={}&refresh=true",
            job_type.filter_code(),
            urlencoding::encode(keyword)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct SearchParameterResolver<G> {
    geocoder: G,
    lookup_timeout: Duration,
    sink: Arc<dyn EventSink>,
}

impl<G: Geocoder> SearchParameterResolver<G> {
    pub fn new(geocoder: G, sink: Arc<dyn EventSink>) -> Self {
        Self {
            geocoder,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            sink,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn resolve_job_type(&self, input: &str) -> JobType {
        JobType::from_input(input)
    }

    /// Never fails. Names outside the fixed table are looked up only so the
    /// user can see what the provider will not be filtering on; the answer
    /// is always the worldwide scope.
    pub async fn resolve_location(&self, input: &str) -> GeoId {
        let name = input.to_lowercase();

        if let Some(id) = GeoId::known(&name) {
            return id;
        }

        if !name.is_empty() {
            self.describe_unknown_location(&name).await;
        }

        GeoId::WORLDWIDE
    }

    async fn describe_unknown_location(&self, name: &str) {
        match tokio::time::timeout(self.lookup_timeout, self.geocoder.lookup(name)).await {
            Ok(Ok(Some(place))) => self.sink.emit(&Event::LocationDetected {
                query: name.to_string(),
                address: place.display_name,
            }),
            Ok(Ok(None)) => info!("No geocoding result for '{}'", name),
            Ok(Err(e)) => error!("Error getting Geo IP location: {:#}", e),
            Err(_) => error!(
                "Error getting Geo IP location: lookup for '{}' timed out after {:?}",
                name, self.lookup_timeout
            ),
        }
    }

    pub async fn build_search_url(
        &self,
        keyword: &str,
        location: &str,
        easy_apply: bool,
        job_type: &str,
    ) -> SearchUrl {
        let job_type = self.resolve_job_type(job_type);
        let geo_id = self.resolve_location(location).await;
        SearchUrl::new(keyword, job_type, geo_id, easy_apply)
    }

    pub async fn build_request_url(&self, request: &SearchRequest) -> SearchUrl {
        let geo_id = self.resolve_location(request.location()).await;
        SearchUrl::new(
            request.keyword(),
            request.job_type(),
            geo_id,
            request.easy_apply(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::RecordingSink;
    use crate::geocode::{GeoPlace, NoGeocoder};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn lookup(&self, _query: &str) -> Result<Option<GeoPlace>> {
            Err(anyhow!("service unavailable"))
        }
    }

    struct HangingGeocoder;

    #[async_trait]
    impl Geocoder for HangingGeocoder {
        async fn lookup(&self, _query: &str) -> Result<Option<GeoPlace>> {
            std::future::pending().await
        }
    }

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn lookup(&self, query: &str) -> Result<Option<GeoPlace>> {
            Ok(Some(GeoPlace {
                display_name: format!("{query}, Somewhere"),
                lat: "0".into(),
                lon: "0".into(),
            }))
        }
    }

    fn resolver<G: Geocoder>(geocoder: G) -> (SearchParameterResolver<G>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (SearchParameterResolver::new(geocoder, sink.clone()), sink)
    }

    #[test]
    fn job_type_is_case_insensitive() {
        assert_eq!(JobType::from_input("REMOTE").filter_code(), 2);
        assert_eq!(JobType::from_input("Remote").filter_code(), 2);
        assert_eq!(JobType::from_input("remote").filter_code(), 2);
        assert_eq!(JobType::from_input("Hybrid").filter_code(), 3);
        assert_eq!(JobType::from_input("ONSITE").filter_code(), 1);
    }

    #[test]
    fn unknown_job_types_default_to_remote() {
        for input in ["", "freelance", "on-site", "HYBRID-ish", "  "] {
            assert_eq!(JobType::from_input(input), JobType::Remote, "{input:?}");
        }
    }

    #[test]
    fn padded_job_type_is_not_recognised() {
        assert_eq!(JobType::from_input(" hybrid ").filter_code(), 2);
        assert_eq!(JobType::from_input("onsite\n").filter_code(), 2);
    }

    #[tokio::test]
    async fn known_locations_ignore_case() {
        let (resolver, _) = resolver(FailingGeocoder);
        assert_eq!(resolver.resolve_location("Indonesia").await.as_str(), "102478259");
        assert_eq!(resolver.resolve_location("indonesia").await.as_str(), "102478259");
        assert_eq!(resolver.resolve_location("United Kingdom").await.as_str(), "101165590");
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_worldwide() {
        let (resolver, sink) = resolver(FailingGeocoder);
        assert_eq!(resolver.resolve_location("Atlantis").await, GeoId::WORLDWIDE);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn padded_location_is_not_a_known_name() {
        let (resolver, _) = resolver(FailingGeocoder);
        assert_eq!(resolver.resolve_location(" indonesia ").await.as_str(), "92000000");
        assert_eq!(resolver.resolve_location("Germany ").await, GeoId::WORLDWIDE);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_lookup_times_out_to_worldwide() {
        let (resolver, _) = resolver(HangingGeocoder);
        let resolver = resolver.with_lookup_timeout(Duration::from_secs(2));
        assert_eq!(resolver.resolve_location("nowhere").await, GeoId::WORLDWIDE);
    }

    #[tokio::test]
    async fn successful_lookup_is_display_only() {
        let (resolver, sink) = resolver(FixedGeocoder);
        assert_eq!(resolver.resolve_location("Lagos").await, GeoId::WORLDWIDE);
        assert_eq!(
            sink.events(),
            vec![Event::LocationDetected {
                query: "lagos".into(),
                address: "lagos, Somewhere".into(),
            }]
        );
    }

    #[tokio::test]
    async fn empty_location_skips_lookup() {
        let (resolver, sink) = resolver(FixedGeocoder);
        assert_eq!(resolver.resolve_location("").await, GeoId::WORLDWIDE);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn url_carries_every_parameter() {
        let (resolver, _) = resolver(FailingGeocoder);
        let url = resolver
            .build_search_url("engineer", "onsite-unknown-place", true, "hybrid")
            .await;

        assert!(url.as_str().contains("f_AL=true"));
        assert!(url.as_str().contains("f_WT=3"));
        assert!(url.as_str().contains("geoId=92000000"));
        assert!(url.as_str().contains("keywords=engineer"));
    }

    #[tokio::test]
    async fn url_is_deterministic() {
        let (resolver, _) = resolver(NoGeocoder);
        let first = resolver.build_search_url("data", "Canada", false, "Onsite").await;
        let second = resolver.build_search_url("data", "Canada", false, "Onsite").await;
        assert_eq!(first, second);
        assert_eq!(
            first.as_str(),
            "https://www.linkedin.com/jobs/search/?f_AL=false&f_WT=1&geoId=101174742&keywords=data&refresh=true"
        );
    }

    #[tokio::test]
    async fn keyword_is_percent_encoded() {
        let (resolver, _) = resolver(NoGeocoder);
        let url = resolver
            .build_search_url("c++ & rust", "worldwide", true, "remote")
            .await;
        assert!(url.as_str().contains("keywords=c%2B%2B%20%26%20rust&refresh=true"));
    }

    #[tokio::test]
    async fn degenerate_inputs_still_build() {
        let (resolver, _) = resolver(FailingGeocoder);
        for easy_apply in [true, false] {
            for job_type in ["", "REMOTE", "hYbRiD", "???"] {
                let url = resolver.build_search_url("", "", easy_apply, job_type).await;
                assert!(url.as_str().contains("geoId=92000000"));
                assert!(url.as_str().ends_with("keywords=&refresh=true"));
            }
        }
    }

    #[tokio::test]
    async fn request_and_parts_agree() {
        let (resolver, _) = resolver(NoGeocoder);
        let request = SearchRequest::new("rust", "Germany", true, "HYBRID");
        assert_eq!(request.job_type(), JobType::Hybrid);
        assert_eq!(
            resolver.build_request_url(&request).await,
            resolver.build_search_url("rust", "Germany", true, "HYBRID").await
        );
    }
}

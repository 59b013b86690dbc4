use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const TEMPLATE_NAME: &str = "sponsor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
    pub phrase: String,
}

pub trait SponsorSource {
    fn fetch(&self) -> Result<Sponsor>;
}

/// Fetch a sponsor as a JSON document over HTTP GET.
pub struct HttpSponsorSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpSponsorSource {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url: url.to_string(),
        }
    }
}

impl SponsorSource for HttpSponsorSource {
    fn fetch(&self) -> Result<Sponsor> {
        let response = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|e| Error::Sponsor(format!("GET {} failed: {e}", self.url)))?;
        response
            .into_json()
            .map_err(|e| Error::Sponsor(format!("failed to parse sponsor: {e}")))
    }
}

/// Compiled summary-line template with `{{ name }}` and `{{ phrase }}`.
pub struct SponsorTemplate {
    engine: upon::Engine<'static>,
}

impl SponsorTemplate {
    pub fn new(template: &str) -> Result<Self> {
        let mut engine = upon::Engine::new();
        engine
            .add_template(TEMPLATE_NAME, template.to_string())
            .map_err(|e| Error::Template(format!("invalid sponsor template: {e}")))?;
        Ok(Self { engine })
    }

    pub fn render(&self, sponsor: &Sponsor) -> Result<String> {
        self.engine
            .template(TEMPLATE_NAME)
            .render(sponsor)
            .to_string()
            .map_err(|e| Error::Template(format!("failed to render sponsor line: {e}")))
    }
}

/// A sponsor source paired with the template that turns it into text.
pub struct Sponsorship {
    source: Box<dyn SponsorSource>,
    template: SponsorTemplate,
}

impl Sponsorship {
    pub fn new(source: Box<dyn SponsorSource>, template: SponsorTemplate) -> Self {
        Self { source, template }
    }

    /// The decorated summary line, or `None` when anything goes wrong.
    /// Sponsor problems never block the report.
    pub fn line(&self) -> Option<String> {
        let sponsor = match self.source.fetch() {
            Ok(sponsor) => sponsor,
            Err(e) => {
                warn!(error = %e, "failed to fetch sponsor");
                return None;
            }
        };
        match self.template.render(&sponsor) {
            Ok(line) => {
                debug!(sponsor = %sponsor.name, "rendered sponsor line");
                Some(line)
            }
            Err(e) => {
                warn!(error = %e, "failed to render sponsor line");
                None
            }
        }
    }
}

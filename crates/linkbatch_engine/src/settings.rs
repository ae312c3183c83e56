use std::time::Duration;

use url::Url;

/// Which response shape the service answers the submit request with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceContract {
    /// `{task_id}` followed by a status stream.
    #[default]
    Streaming,
    /// `{results: [...]}` in the submit response itself.
    SingleShot,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub contract: ServiceContract,
    pub connect_timeout: Duration,
    /// Whole-request timeout for the submit; `None` waits for the service.
    pub request_timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            contract: ServiceContract::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }

    pub fn submit_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join("/api/download")
    }

    /// Status stream URL, with the task id encoded as a single path segment.
    pub fn status_url(&self, task_id: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join("/api/download/status/")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(task_id);
        Ok(url)
    }
}

use thiserror::Error;

/// Ordered, non-empty list of trimmed links.
///
/// Only [`normalize_links`] builds one, so a batch always holds at least one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBatch(Vec<String>);

impl LinkBatch {
    pub fn links(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_links(self) -> Vec<String> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter at least one link")]
    EmptyBatch,
}

/// Splits raw input into trimmed, non-empty lines, preserving order.
pub fn normalize_links(raw: &str) -> Result<LinkBatch, ValidationError> {
    let links: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if links.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }
    Ok(LinkBatch(links))
}

use std::fmt;

/// Which upstream service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Geocoding,
    Forecast,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Geocoding => "geocoding",
            Service::Forecast => "forecast",
        }
    }

    /// User-facing message when this service fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Service::Geocoding => "Failed to find location",
            Service::Forecast => "Failed to fetch weather data",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level or payload failure while talking to an upstream service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.service.failure_message())]
pub struct ServiceError {
    pub service: Service,
    /// HTTP status, if a response was received at all.
    pub status: Option<u16>,
    pub detail: String,
}

impl ServiceError {
    pub fn status(service: Service, status: u16, body: &str) -> Self {
        Self {
            service,
            status: Some(status),
            detail: truncate_body(body),
        }
    }

    pub fn transport(service: Service, err: &anyhow::Error) -> Self {
        Self {
            service,
            status: None,
            detail: format!("{err:#}"),
        }
    }

    pub fn malformed(service: Service, status: u16, err: &serde_json::Error) -> Self {
        Self {
            service,
            status: Some(status),
            detail: format!("malformed response body: {err}"),
        }
    }
}

/// Everything a lookup can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Geocoding returned no match for the query.
    #[error("Location not found")]
    NotFound { query: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Retry requested before any lookup had succeeded.
    #[error("No previous location to retry")]
    NoPriorLookup,

    #[error("Enter a location to search")]
    EmptyQuery,
}

impl LookupError {
    /// Longer form for logs: includes status and upstream detail.
    pub fn diagnostic(&self) -> String {
        match self {
            LookupError::Service(e) => match e.status {
                Some(status) => format!("{} ({} service returned {}: {})", e, e.service, status, e.detail),
                None => format!("{} ({} service unreachable: {})", e, e.service, e.detail),
            },
            LookupError::NotFound { query } => format!("{self}: '{query}'"),
            other => other.to_string(),
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

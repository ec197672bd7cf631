use crate::error::RequestError;
use crate::identity::URL_SCHEME_NAME;
use url::Url;

/// Parsed `szcontext://open?app=<identifier>&path=<absolute path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenUrl {
    pub app: String,
    pub path: String,
}

impl OpenUrl {
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let invalid = |reason: &str| RequestError::InvalidUrl {
            scheme: URL_SCHEME_NAME,
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|err| invalid(&err.to_string()))?;
        if url.scheme() != URL_SCHEME_NAME {
            return Err(invalid(&format!("unexpected scheme '{}'", url.scheme())));
        }
        if url.host_str() != Some("open") {
            return Err(invalid("only the 'open' action is supported"));
        }

        let mut app = None;
        let mut path = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "app" => app = Some(value.into_owned()),
                "path" => path = Some(value.into_owned()),
                _ => {}
            }
        }

        match (app, path) {
            (Some(app), Some(path)) if !app.is_empty() && !path.is_empty() => Ok(Self { app, path }),
            _ => Err(invalid("both 'app' and 'path' are required")),
        }
    }
}

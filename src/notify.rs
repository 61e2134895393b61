use std::error::Error;

/// Reports outcome of user actions
pub trait Notifications: Send + Sync {
    fn success(&self, text: &str);
    fn error(&self, title: &str, err: &(dyn Error + 'static), message: &str);
}

/// Full source chain, outermost first
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Writes notifications to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifications;

impl Notifications for LogNotifications {
    fn success(&self, text: &str) {
        log::info!("{}", text);
    }

    fn error(&self, title: &str, err: &(dyn Error + 'static), message: &str) {
        log::error!("{}: {} ({})", title, message, error_chain(err));
    }
}

#[cfg(test)]
mod tests {
    use super::error_chain;
    use crate::error::{BackendError, ServiceError};

    #[test]
    fn chain_includes_cause() {
        let err = ServiceError::Update {
            message: "Unable to update settings",
            source: BackendError::Status {
                status: 403,
                message: "forbidden".to_owned(),
            },
        };
        assert_eq!(
            error_chain(&err),
            "Unable to update settings: api error 403: forbidden"
        );
    }
}

use std::fmt;

use tracing::{debug, info};

type Callback = Box<dyn FnOnce(bool) + Send>;

/// Delivers the verification result to the embedding application.
pub struct ResultReporter {
    callback: Option<Callback>,
}

impl ResultReporter {
    pub fn new(callback: impl FnOnce(bool) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Invoke the callback with `verified`.
    ///
    /// ## Returns
    /// `false` if a result was already reported, in which case nothing happens.
    pub fn report(&mut self, verified: bool) -> bool {
        let Some(callback) = self.callback.take() else {
            debug!(verified, "result already reported");
            return false;
        };
        info!(verified, "reporting verification result");
        callback(verified);
        true
    }

    pub fn has_reported(&self) -> bool {
        self.callback.is_none()
    }
}

impl fmt::Debug for ResultReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultReporter")
            .field("reported", &self.has_reported())
            .finish()
    }
}

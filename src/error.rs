//! Error taxonomy and the accumulator used by multi-step transfer sequences.

/// The two recoverable failure kinds the driver can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A bounded wait for transfer readiness exceeded its deadline.
    CommTimeout,
    /// A parameter was out of range for the register field or operation it
    /// was given to, or a configuration was malformed at creation time.
    InvalidParam,
}

/// Records the first failure across a multi-step sequence while letting the
/// remaining steps run.
///
/// A display write is fire-and-forget: aborting an initialization script or a
/// window-set sequence halfway through can leave the controller in a worse,
/// partially configured state than completing it with one garbled register.
/// Compound operations therefore record every sub-step result here and
/// surface only the first failure kind, once, at the end.
#[derive(Debug, Default)]
pub struct Outcome {
    first: Option<Error>,
}

impl Outcome {
    pub fn new() -> Self {
        Outcome { first: None }
    }

    /// Absorb one sub-step result. The first error wins; later errors and
    /// all successes leave the outcome unchanged.
    pub fn record(&mut self, result: Result<(), Error>) {
        if let (None, Err(e)) = (self.first, result) {
            self.first = Some(e);
        }
    }

    pub fn is_ok(&self) -> bool {
        self.first.is_none()
    }

    pub fn into_result(self) -> Result<(), Error> {
        match self.first {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_outcome_is_ok() {
        let outcome = Outcome::new();
        assert!(outcome.is_ok());
        assert_eq!(outcome.into_result(), Ok(()));
    }

    #[test]
    fn successes_leave_outcome_ok() {
        let mut outcome = Outcome::new();
        outcome.record(Ok(()));
        outcome.record(Ok(()));
        assert_eq!(outcome.into_result(), Ok(()));
    }

    #[test]
    fn first_failure_is_kept() {
        let mut outcome = Outcome::new();
        outcome.record(Ok(()));
        outcome.record(Err(Error::CommTimeout));
        outcome.record(Err(Error::InvalidParam));
        outcome.record(Ok(()));
        assert!(!outcome.is_ok());
        assert_eq!(outcome.into_result(), Err(Error::CommTimeout));
    }
}

// src/webhook/retry.rs

//! Pure retry state machine for a single webhook destination.
//!
//! ```text
//! Idle --start--> Attempting(1) --failure--> Attempting(2) ... --failure--> Exhausted
//!                      |                          |
//!                      +--------success-----------+-----------------------> Succeeded
//! ```
//!
//! The machine performs no IO and never sleeps. It tells the async shell
//! (`dispatcher`) what to do next through [`RetryStep`], so tests can step
//! it with synthetic outcomes.

/// Result of a single request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The expected status code came back.
    Success { status: u16 },
    /// No response: connect, DNS, TLS or timeout failure.
    TransportFailure(String),
    /// A response arrived but with the wrong status code.
    UnexpectedStatus { status: u16, expected: u16 },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    /// Attempt `n` (1-based) is in flight.
    Attempting(u32),
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// What the shell should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Perform attempt `n` right away.
    Attempt(u32),
    /// Wait the backoff interval, then perform attempt `n`.
    BackoffThenAttempt(u32),
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl RetryStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryStep::Succeeded { .. } | RetryStep::Exhausted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RetryMachine {
    max_attempts: u32,
    state: RetryState,
}

impl RetryMachine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            state: RetryState::Idle,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Leave `Idle`. A budget of zero attempts is exhausted immediately.
    ///
    /// Calling this in any other state returns the current step unchanged.
    pub fn start(&mut self) -> RetryStep {
        match self.state {
            RetryState::Idle if self.max_attempts == 0 => {
                self.state = RetryState::Exhausted { attempts: 0 };
                RetryStep::Exhausted { attempts: 0 }
            }
            RetryState::Idle => {
                self.state = RetryState::Attempting(1);
                RetryStep::Attempt(1)
            }
            _ => self.current_step(),
        }
    }

    /// Feed the outcome of the in-flight attempt.
    ///
    /// Outside `Attempting` this is a no-op returning the current step
    /// (`Idle` is treated as a call to [`start`](Self::start)).
    pub fn record(&mut self, outcome: &AttemptOutcome) -> RetryStep {
        let n = match self.state {
            RetryState::Attempting(n) => n,
            RetryState::Idle => return self.start(),
            _ => return self.current_step(),
        };

        if outcome.is_success() {
            self.state = RetryState::Succeeded { attempts: n };
        } else if n >= self.max_attempts {
            self.state = RetryState::Exhausted { attempts: n };
        } else {
            self.state = RetryState::Attempting(n + 1);
            return RetryStep::BackoffThenAttempt(n + 1);
        }
        self.current_step()
    }

    fn current_step(&self) -> RetryStep {
        match self.state {
            RetryState::Idle => RetryStep::Attempt(1),
            RetryState::Attempting(n) => RetryStep::Attempt(n),
            RetryState::Succeeded { attempts } => RetryStep::Succeeded { attempts },
            RetryState::Exhausted { attempts } => RetryStep::Exhausted { attempts },
        }
    }
}

use tracing::{debug, info};

use crate::alert::CompletionNotifier;
use crate::timer::duration::{CountdownDuration, InvalidDurationInput, format_hms, parse_duration};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TimerState {
    pub remaining: u64,
    pub running: bool,
}

impl TimerState {
    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else if self.remaining == 0 {
            TimerPhase::Idle
        } else {
            TimerPhase::Paused
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StartOutcome {
    /// Started from idle with a freshly parsed duration.
    Started(CountdownDuration),
    Resumed { remaining: u64 },
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    Ignored,
    Running { remaining: u64 },
    /// Reached zero; the notifier has run and the timer is idle again.
    Expired,
}

pub struct CountdownTimer<N> {
    state: TimerState,
    notifier: N,
}

impl<N: CompletionNotifier> CountdownTimer<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            state: TimerState::default(),
            notifier,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> TimerPhase {
        self.state().phase()
    }

    pub fn remaining(&self) -> u64 {
        self.state.remaining
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// `input` is only read when idle; a paused countdown resumes where it stopped.
    pub fn start(&mut self, input: &str) -> Result<StartOutcome, InvalidDurationInput> {
        match self.state.phase() {
            TimerPhase::Running => Ok(StartOutcome::AlreadyRunning),
            TimerPhase::Paused => {
                self.state.running = true;
                info!("countdown resumed at {}", self.render());
                Ok(StartOutcome::Resumed {
                    remaining: self.state.remaining,
                })
            }
            TimerPhase::Idle => {
                let duration = parse_duration(input)?;
                self.state.remaining = duration.total_seconds();
                self.state.running = true;
                info!("countdown started for {duration}");
                Ok(StartOutcome::Started(duration))
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        info!("countdown paused at {}", self.render());
        true
    }

    pub fn reset(&mut self) {
        if self.state != TimerState::default() {
            info!("countdown reset from {}", self.render());
        }
        self.state = TimerState::default();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.running || self.state.remaining == 0 {
            debug!("ignoring tick while {:?}", self.state.phase());
            return TickOutcome::Ignored;
        }

        self.state.remaining -= 1;
        if self.state.remaining > 0 {
            debug!("tick: {}", self.render());
            return TickOutcome::Running {
                remaining: self.state.remaining,
            };
        }

        info!("countdown expired");
        self.notifier.notify_completion();
        self.reset();
        TickOutcome::Expired
    }

    pub fn render(&self) -> String {
        format_hms(self.state.remaining)
    }
}

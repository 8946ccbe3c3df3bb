use std::io::{self, Write};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::alert::{CompletionNotifier, SoundAlert};
use crate::pacing::{TickSchedule, sleep_until};
use crate::timer::duration::format_hms;
use crate::timer::state::{CountdownTimer, StartOutcome, TickOutcome};

pub const COMPLETION_MESSAGE: &str = "Time's Up! Countdown Complete!";

struct TerminalAlert {
    sound: SoundAlert,
    completed: bool,
    cue: Option<JoinHandle<()>>,
}

impl CompletionNotifier for TerminalAlert {
    fn notify_completion(&mut self) {
        self.cue = self.sound.play();
        self.completed = true;
    }
}

/// Runs one countdown on the current thread, printing the display once per tick.
pub fn run_headless(input: &str, sound: SoundAlert, step: Duration) -> Result<()> {
    let mut out = io::stdout().lock();
    let mut timer = CountdownTimer::new(TerminalAlert {
        sound,
        completed: false,
        cue: None,
    });
    let mut schedule = TickSchedule::new(step);

    let duration = match timer.start(input)? {
        StartOutcome::Started(duration) => duration,
        StartOutcome::Resumed { .. } | StartOutcome::AlreadyRunning => {
            anyhow::bail!("headless countdown must start from idle")
        }
    };
    writeln!(out, "{}", duration.canonical()).context("failed to write countdown")?;
    schedule.arm(Instant::now());
    info!(
        "headless countdown running for {} (tick every {} ms)",
        duration,
        schedule.step().as_millis()
    );

    while let Some(deadline) = schedule.next_deadline() {
        sleep_until(deadline);
        if !schedule.take_due(Instant::now()) {
            continue;
        }
        match timer.tick() {
            TickOutcome::Running { remaining } => {
                writeln!(out, "{}", format_hms(remaining)).context("failed to write countdown")?;
            }
            TickOutcome::Expired => {
                schedule.cancel();
                writeln!(out, "{}", timer.render()).context("failed to write countdown")?;
            }
            TickOutcome::Ignored => schedule.cancel(),
        }
    }

    if timer.notifier().completed {
        writeln!(out, "{COMPLETION_MESSAGE}").context("failed to write countdown")?;
    }
    out.flush().context("failed to flush countdown output")?;

    if let Some(cue) = timer.notifier_mut().cue.take()
        && cue.join().is_err()
    {
        warn!("alert thread panicked");
    }
    Ok(())
}

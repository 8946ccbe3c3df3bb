use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::settings::AlertSettings;

/// Called by the countdown exactly once each time it runs out.
pub trait CompletionNotifier {
    fn notify_completion(&mut self);
}

struct SoundPlayer {
    program: &'static str,
    args: &'static [&'static str],
    requires_file: Option<&'static str>,
}

#[cfg(target_os = "linux")]
const SOUND_PLAYERS: &[SoundPlayer] = &[
    SoundPlayer {
        program: "paplay",
        args: &["/usr/share/sounds/freedesktop/stereo/complete.oga"],
        requires_file: Some("/usr/share/sounds/freedesktop/stereo/complete.oga"),
    },
    SoundPlayer {
        program: "aplay",
        args: &["-q", "/usr/share/sounds/sound-icons/guitar-11.wav"],
        requires_file: Some("/usr/share/sounds/sound-icons/guitar-11.wav"),
    },
];

#[cfg(target_os = "macos")]
const SOUND_PLAYERS: &[SoundPlayer] = &[SoundPlayer {
    program: "afplay",
    args: &["/System/Library/Sounds/Glass.aiff"],
    requires_file: Some("/System/Library/Sounds/Glass.aiff"),
}];

#[cfg(windows)]
const SOUND_PLAYERS: &[SoundPlayer] = &[SoundPlayer {
    program: "powershell",
    args: &["-NoProfile", "-Command", "[console]::beep(1200,300)"],
    requires_file: None,
}];

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
const SOUND_PLAYERS: &[SoundPlayer] = &[];

/// Repeats a short audible cue on a background thread.
#[derive(Debug, Clone)]
pub struct SoundAlert {
    enabled: bool,
    beep_count: u32,
    beep_interval: Duration,
}

impl SoundAlert {
    pub fn from_settings(settings: &AlertSettings) -> Self {
        Self {
            enabled: settings.sound_enabled,
            beep_count: settings.beep_count,
            beep_interval: Duration::from_millis(settings.beep_interval_ms),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.beep_count > 0
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Dropping the handle detaches the cue thread; join it to let the cues finish.
    pub fn play(&self) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            debug!("sound alert disabled, skipping cue");
            return None;
        }

        let count = self.beep_count;
        let interval = self.beep_interval;
        let spawned = thread::Builder::new()
            .name("countdown-alert".to_string())
            .spawn(move || {
                for index in 0..count {
                    if index > 0 {
                        thread::sleep(interval);
                    }
                    play_cue();
                }
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("failed to start alert thread: {err}");
                ring_terminal_bell();
                None
            }
        }
    }
}

impl CompletionNotifier for SoundAlert {
    fn notify_completion(&mut self) {
        let _ = self.play();
    }
}

fn play_cue() {
    if !play_platform_sound() {
        ring_terminal_bell();
    }
}

fn play_platform_sound() -> bool {
    for player in SOUND_PLAYERS {
        if let Some(file) = player.requires_file
            && !Path::new(file).exists()
        {
            continue;
        }
        match Command::new(player.program)
            .args(player.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => return true,
            Ok(status) => debug!("{} exited with {status}", player.program),
            Err(err) => debug!("{} unavailable: {err}", player.program),
        }
    }
    false
}

fn ring_terminal_bell() {
    let mut stderr = io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}

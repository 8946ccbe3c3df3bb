use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, TimeDelta};
use eframe::egui::{self, Align2, Color32, Key, RichText, TextEdit, TopBottomPanel, Ui};
use tracing::{debug, info, warn};

use crate::alert::{CompletionNotifier, SoundAlert};
use crate::pacing::TickSchedule;
use crate::settings::{AlertSettings, Settings, save_settings};
use crate::timer::duration::format_hms;
use crate::timer::state::{CountdownTimer, StartOutcome, TickOutcome, TimerPhase};

const BACKGROUND: Color32 = Color32::from_rgb(30, 30, 46);
const TITLE: Color32 = Color32::from_rgb(255, 215, 0);
const DISPLAY: Color32 = Color32::from_rgb(0, 255, 170);
const ALERT: Color32 = Color32::from_rgb(255, 75, 75);
const START_FILL: Color32 = Color32::from_rgb(0, 162, 255);
const PAUSE_FILL: Color32 = Color32::from_rgb(255, 178, 0);
const RESET_FILL: Color32 = Color32::from_rgb(255, 75, 75);
const MUTED: Color32 = Color32::from_rgb(170, 170, 170);
const OK: Color32 = Color32::from_rgb(111, 228, 134);

pub fn run_gui(
    settings: Settings,
    settings_path: PathBuf,
    initial_input: String,
    tick_step: Duration,
) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Countdown Timer")
            .with_inner_size([420.0, 340.0])
            .with_min_inner_size([380.0, 320.0]),
        ..Default::default()
    };

    let app = CountdownApp::new(settings, settings_path, initial_input, tick_step);

    eframe::run_native(
        "Countdown Timer",
        native_options,
        Box::new(move |cc| {
            configure_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to launch countdown GUI: {err}"))?;

    Ok(())
}

fn configure_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(226, 230, 240));
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = Color32::from_rgb(38, 38, 58);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(44, 44, 66);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(58, 58, 86);
    visuals.widgets.active.bg_fill = Color32::from_rgb(72, 72, 104);
    visuals.selection.bg_fill = Color32::from_rgb(0, 122, 190);
    ctx.set_visuals(visuals);
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct ControlState {
    start: bool,
    pause: bool,
    reset: bool,
    entry: bool,
}

fn controls_for(phase: TimerPhase) -> ControlState {
    match phase {
        TimerPhase::Idle => ControlState {
            start: true,
            pause: false,
            reset: false,
            entry: true,
        },
        TimerPhase::Running => ControlState {
            start: false,
            pause: true,
            reset: true,
            entry: false,
        },
        TimerPhase::Paused => ControlState {
            start: true,
            pause: false,
            reset: true,
            entry: false,
        },
    }
}

/// Sound, label flash and the "Time's Up!" notice shown when the countdown ends.
struct WindowAlert {
    sound: SoundAlert,
    flash_cycles: u32,
    flash_interval: Duration,
    flash_started: Option<Instant>,
    notice_open: bool,
}

impl WindowAlert {
    fn from_settings(settings: &AlertSettings) -> Self {
        Self {
            sound: SoundAlert::from_settings(settings),
            flash_cycles: settings.flash_cycles,
            flash_interval: Duration::from_millis(settings.flash_interval_ms.max(1)),
            flash_started: None,
            notice_open: false,
        }
    }

    fn flash_slot(&self, now: Instant) -> Option<u128> {
        let started = self.flash_started?;
        let slot = now.saturating_duration_since(started).as_millis()
            / self.flash_interval.as_millis().max(1);
        (slot < u128::from(self.flash_cycles) * 2).then_some(slot)
    }

    fn is_flashing(&self, now: Instant) -> bool {
        self.flash_slot(now).is_some()
    }

    fn flash_on(&self, now: Instant) -> bool {
        self.flash_slot(now).is_some_and(|slot| slot % 2 == 0)
    }
}

impl CompletionNotifier for WindowAlert {
    fn notify_completion(&mut self) {
        let _ = self.sound.play();
        self.flash_started = Some(Instant::now());
        self.notice_open = true;
    }
}

struct CountdownApp {
    timer: CountdownTimer<WindowAlert>,
    schedule: TickSchedule,
    settings: Settings,
    settings_path: PathBuf,
    default_input: String,
    duration_input: String,
    status_message: Option<(String, bool, Instant)>,
    focus_entry: bool,
}

impl CountdownApp {
    fn new(
        settings: Settings,
        settings_path: PathBuf,
        initial_input: String,
        tick_step: Duration,
    ) -> Self {
        Self {
            timer: CountdownTimer::new(WindowAlert::from_settings(&settings.alert)),
            schedule: TickSchedule::new(tick_step),
            settings,
            settings_path,
            default_input: initial_input.clone(),
            duration_input: initial_input,
            status_message: None,
            focus_entry: false,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), false, Instant::now() + ttl));
    }

    fn set_error(&mut self, text: impl Into<String>, ttl: Duration) {
        self.status_message = Some((text.into(), true, Instant::now() + ttl));
    }

    fn start_action(&mut self) {
        match self.timer.start(&self.duration_input) {
            Ok(StartOutcome::Started(duration)) => {
                self.duration_input = duration.canonical();
                self.schedule.arm(Instant::now());
                self.set_status(format!("Counting down {duration}."), Duration::from_secs(2));
            }
            Ok(StartOutcome::Resumed { remaining }) => {
                self.schedule.arm(Instant::now());
                self.set_status(
                    format!("Resumed at {}.", format_hms(remaining)),
                    Duration::from_secs(2),
                );
            }
            Ok(StartOutcome::AlreadyRunning) => {}
            Err(err) => {
                warn!("rejected duration input '{}': {err}", self.duration_input);
                self.set_error(err.to_string(), Duration::from_secs(6));
            }
        }
    }

    fn pause_action(&mut self) {
        if self.timer.pause() {
            self.schedule.cancel();
            self.set_status("Paused.", Duration::from_secs(2));
        }
    }

    fn reset_action(&mut self) {
        self.timer.reset();
        self.schedule.cancel();
        self.duration_input = self.default_input.clone();
        self.focus_entry = true;
        self.set_status("Reset.", Duration::from_secs(2));
    }

    /// Delivers every tick that fell due since the last frame, so a stalled
    /// window catches up instead of losing seconds.
    fn pump_ticks(&mut self, now: Instant) {
        let mut delivered = 0u64;
        while self.schedule.take_due(now) {
            delivered += 1;
            match self.timer.tick() {
                TickOutcome::Running { .. } => {}
                TickOutcome::Expired => {
                    self.schedule.cancel();
                    self.duration_input = self.default_input.clone();
                    self.set_status("Countdown complete.", Duration::from_secs(4));
                }
                TickOutcome::Ignored => self.schedule.cancel(),
            }
        }

        if delivered > 1 {
            debug!("caught up {delivered} ticks after a stalled frame");
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (enter, space, reset) = ctx.input(|input| {
            let plain = input.modifiers.is_none();
            (
                input.key_pressed(Key::Enter),
                plain && input.key_pressed(Key::Space),
                plain && input.key_pressed(Key::R),
            )
        });

        if self.timer.notifier().notice_open {
            if enter {
                self.timer.notifier_mut().notice_open = false;
            }
            return;
        }

        let typing = ctx.wants_keyboard_input();
        if enter {
            self.start_action();
        }
        if space && !typing {
            self.pause_action();
        }
        if reset && !typing {
            self.reset_action();
        }
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        self.timer.notifier_mut().sound.set_enabled(enabled);
        self.settings.alert.sound_enabled = enabled;
        if let Err(err) = save_settings(&self.settings_path, &self.settings) {
            warn!("failed to persist settings: {err:#}");
            self.set_error(format!("Persist failed: {err}"), Duration::from_secs(4));
        } else {
            info!("sound alert {}", if enabled { "enabled" } else { "disabled" });
            self.set_status(
                if enabled { "Sound on." } else { "Sound off." },
                Duration::from_secs(2),
            );
        }
    }

    fn show_display(&self, ui: &mut Ui, now: Instant) {
        let color = if self.timer.notifier().flash_on(now) {
            ALERT
        } else {
            DISPLAY
        };
        ui.label(
            RichText::new(self.timer.render())
                .size(56.0)
                .monospace()
                .strong()
                .color(color),
        );

        let subtitle = match self.timer.phase() {
            TimerPhase::Running => ends_at_text(self.timer.remaining()),
            TimerPhase::Paused => "Paused".to_string(),
            TimerPhase::Idle => "Ready".to_string(),
        };
        ui.label(RichText::new(subtitle).color(MUTED));
    }

    fn show_controls(&mut self, ui: &mut Ui) {
        let controls = controls_for(self.timer.phase());

        let entry = ui.add_enabled(
            controls.entry,
            TextEdit::singleline(&mut self.duration_input)
                .font(egui::TextStyle::Heading)
                .desired_width(160.0),
        );
        if self.focus_entry && controls.entry {
            entry.request_focus();
            self.focus_entry = false;
        }
        ui.add_space(12.0);

        let button_size = egui::vec2(96.0, 32.0);
        let mut start = false;
        let mut pause = false;
        let mut reset = false;
        ui.horizontal(|ui| {
            let row_width = button_size.x * 3.0 + ui.spacing().item_spacing.x * 2.0;
            ui.add_space(((ui.available_width() - row_width) / 2.0).max(0.0));
            start = ui
                .add_enabled(controls.start, action_button("Start", START_FILL, button_size))
                .clicked();
            pause = ui
                .add_enabled(controls.pause, action_button("Pause", PAUSE_FILL, button_size))
                .clicked();
            reset = ui
                .add_enabled(controls.reset, action_button("Reset", RESET_FILL, button_size))
                .clicked();
        });
        if start {
            self.start_action();
        }
        if pause {
            self.pause_action();
        }
        if reset {
            self.reset_action();
        }

        ui.add_space(8.0);
        let mut sound_enabled = self.settings.alert.sound_enabled;
        if ui.checkbox(&mut sound_enabled, "Sound").changed() {
            self.set_sound_enabled(sound_enabled);
        }

        if let Some((msg, is_error, _)) = &self.status_message {
            ui.label(
                RichText::new(msg)
                    .color(if *is_error { ALERT } else { OK })
                    .strong(),
            );
        }
    }

    fn show_completion_notice(&mut self, ctx: &egui::Context) {
        if !self.timer.notifier().notice_open {
            return;
        }
        let mut close = false;
        egui::Window::new("Time's Up!")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("Countdown Complete!")
                            .size(20.0)
                            .color(TITLE)
                            .strong(),
                    );
                    ui.add_space(8.0);
                    close = ui.button("OK").clicked();
                });
            });
        if close {
            self.timer.notifier_mut().notice_open = false;
        }
    }

    fn next_repaint(&self, now: Instant) -> Option<Duration> {
        let mut wait = self.schedule.wait_hint(now);
        let alert = self.timer.notifier();
        if alert.is_flashing(now) {
            let flash = alert.flash_interval.min(Duration::from_millis(50));
            wait = Some(wait.map_or(flash, |current| current.min(flash)));
        }
        if let Some((_, _, expires_at)) = &self.status_message {
            let ttl = expires_at.saturating_duration_since(now);
            wait = Some(wait.map_or(ttl, |current| current.min(ttl)));
        }
        wait
    }
}

impl eframe::App for CountdownApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if let Some((_, _, expires_at)) = &self.status_message
            && now >= *expires_at
        {
            self.status_message = None;
        }

        self.pump_ticks(now);
        self.handle_shortcuts(ctx);

        TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("Countdown Timer").size(22.0).color(TITLE).strong());
                });
            });

        TopBottomPanel::bottom("footer")
            .resizable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new(
                            "Formats: SS | MM:SS | HH:MM:SS   Enter: Start   Space: Pause   R: Reset",
                        )
                        .size(11.0)
                        .color(MUTED),
                    );
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(6.0);
                self.show_display(ui, now);
                ui.add_space(10.0);
                self.show_controls(ui);
            });
        });

        self.show_completion_notice(ctx);

        if let Some(wait) = self.next_repaint(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}

fn action_button(label: &str, fill: Color32, size: egui::Vec2) -> egui::Button<'static> {
    egui::Button::new(RichText::new(label).color(Color32::WHITE).strong())
        .fill(fill)
        .min_size(size)
}

fn ends_at_text(remaining: u64) -> String {
    let end = i64::try_from(remaining)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| Local::now().checked_add_signed(delta));
    match end {
        Some(end) => format!("Ends at {}", end.format("%H:%M:%S")),
        None => "Running".to_string(),
    }
}

//! Hardware Relay Desktop Application
//!
//! Shows relayed hardware status messages as toasts. The egui UI thread is
//! the one context that presents; simulated BLE callbacks run on their own
//! threads and only ever talk to the shared relay.

use anyhow::Result;
use chrono::{DateTime, Local};
use hwrelay_core::config::MAX_TOAST_DURATION_MS;
use hwrelay_core::{init, Config, HardwareMessage, MessageRelay, PresentationSink, UiDispatcher};
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const MAX_VISIBLE_TOASTS: usize = 5;
const MAX_HISTORY: usize = 200;

struct Toast {
    text: String,
    shown_at: DateTime<Local>,
    expires_at: Instant,
}

/// Presentation sink owned by the UI thread
struct ToastBoard {
    toasts: VecDeque<Toast>,
    history: VecDeque<(DateTime<Local>, String)>,
    lifetime: Duration,
}

impl ToastBoard {
    fn new(lifetime: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            history: VecDeque::new(),
            lifetime: lifetime.min(Duration::from_millis(MAX_TOAST_DURATION_MS)),
        }
    }

    /// Drop expired toasts and return how long until the next one expires.
    fn expire(&mut self, now: Instant) -> Option<Duration> {
        self.toasts.retain(|toast| toast.expires_at > now);
        self.toasts
            .iter()
            .map(|toast| toast.expires_at - now)
            .min()
    }
}

impl PresentationSink for ToastBoard {
    fn present(&mut self, message: HardwareMessage) {
        let now = Local::now();

        self.history.push_back((now, message.text().to_string()));
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }

        if message.is_blank() {
            return;
        }

        let shown = Instant::now();
        self.toasts.push_back(Toast {
            text: message.into_text(),
            shown_at: now,
            expires_at: shown.checked_add(self.lifetime).unwrap_or(shown),
        });
        if self.toasts.len() > MAX_VISIBLE_TOASTS {
            self.toasts.pop_front();
        }
    }
}

/// Main application state
struct RelayApp {
    relay: MessageRelay,
    dispatcher: UiDispatcher<ToastBoard>,

    // UI state
    device_name: String,
    show_debug: bool,
}

impl RelayApp {
    fn new(cc: &eframe::CreationContext<'_>, relay: MessageRelay, lifetime: Duration) -> Self {
        let ctx = cc.egui_ctx.clone();
        let dispatcher =
            relay.attach_with_waker(ToastBoard::new(lifetime), move || ctx.request_repaint());

        Self {
            relay,
            dispatcher,
            device_name: "BLE-Peripheral".to_string(),
            show_debug: false,
        }
    }

    /// Stand-in for a BLE callback thread reporting a sequence of events
    fn spawn_producer(events: Vec<String>, spacing: Duration) {
        let spawned = thread::Builder::new()
            .name("ble-callback".to_string())
            .spawn(move || {
                for event in events {
                    MessageRelay::shared().deliver(event);
                    thread::sleep(spacing);
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn simulated BLE thread: {}", e);
        }
    }
}

impl eframe::App for RelayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dispatcher.pump();
        let next_expiry = self.dispatcher.sink_mut().expire(Instant::now());

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Hardware Relay");
                ui.separator();
                ui.label(format!("Presented: {}", self.dispatcher.presented()));
                ui.separator();
                ui.checkbox(&mut self.show_debug, "Debug");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Device:");
                ui.text_edit_singleline(&mut self.device_name);
            });

            let device = self.device_name.trim().to_string();
            let step = Duration::from_millis(400);
            ui.horizontal(|ui| {
                if ui.button("Connect").clicked() {
                    Self::spawn_producer(
                        vec![
                            format!("Connecting to {}", device),
                            format!("Connected to {}", device),
                            format!("Services ready on {}", device),
                        ],
                        step,
                    );
                }
                if ui.button("Disconnect").clicked() {
                    Self::spawn_producer(vec![format!("{} disconnected", device)], step);
                }
                if ui.button("Read battery").clicked() {
                    Self::spawn_producer(vec![format!("{} battery level 87%", device)], step);
                }
                if ui.button("Burst").clicked() {
                    let burst = (0..100)
                        .map(|i| format!("{} notification #{}", device, i))
                        .collect();
                    Self::spawn_producer(burst, Duration::ZERO);
                }
            });

            ui.separator();
            ui.heading("History");

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .max_height(220.0)
                .show(ui, |ui| {
                    for (at, text) in self.dispatcher.sink().history.iter().rev() {
                        ui.horizontal(|ui| {
                            ui.colored_label(
                                egui::Color32::YELLOW,
                                at.format("[%H:%M:%S]").to_string(),
                            );
                            ui.label(text);
                        });
                    }
                });

            if self.show_debug {
                ui.separator();
                ui.monospace(self.relay.debug_info());
            }
        });

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                for toast in &self.dispatcher.sink().toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(format!("🔔 {}", toast.text));
                        ui.small(toast.shown_at.format("%H:%M:%S").to_string());
                    });
                }
            });

        if let Some(wait) = next_expiry {
            ctx.request_repaint_after(wait);
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Hardware Relay desktop application");

    let config = Config::load_or_default(&Config::default_path())?;
    let lifetime = Duration::from_millis(config.toast_duration_ms);
    let relay = init(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([560.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        &config.app_name,
        options,
        Box::new(move |cc| Ok(Box::new(RelayApp::new(cc, relay, lifetime)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run eframe application: {}", e))?;

    Ok(())
}

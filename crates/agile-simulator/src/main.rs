//! Desktop simulator for the agile-rs electricity price display.
//!
//! Runs agile-core's controller and display manager against an SDL2 window
//! via `embedded-graphics-simulator`. Prices come from the live Octopus API;
//! when that fails a synthetic day is generated so the pages still render.
//!
//! # Configuration
//!
//! | Variable       | Meaning                                   |
//! |----------------|-------------------------------------------|
//! | `AGILE_CONFIG` | Path to a JSON config (tariff, schedule)  |
//! | `AGILE_OFFLINE`| Skip the network, use synthetic prices    |
//!
//! # Key bindings
//!
//! | Key | Action                       |
//! |-----|------------------------------|
//! | 1   | Start-up page                |
//! | 2   | Prices page                  |
//! | 3   | Error page                   |
//! | R   | Force a redraw               |
//! | Q   | Quit                         |
//!
//! Mouse clicks are forwarded as touches: right half brightens, left half
//! dims, and a click on a blank screen wakes it.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use embassy_futures::block_on;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use agile_core::app_state::{AppError, error_message};
use agile_core::backlight::Tone;
use agile_core::config::{Config, InternetConfig, TariffConfig};
use agile_core::controller::Controller;
use agile_core::display_manager::{DisplayManager, DisplayRequest};
use agile_core::metrics::Rgb888Triple;
use agile_core::peripherals::{Backlight, Buzzer, StatusLight};
use agile_core::tariff::{PriceSet, PriceSlot, SLOTS_PER_DAY, parse_unit_rates};
use agile_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, PageId, StartupStep, TouchPoint};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Same 20 ms poll as the device.
const FRAME_DURATION: Duration = Duration::from_millis(20);

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Simulated peripherals
// ---------------------------------------------------------------------------

/// Brightness applied when the framebuffer is copied to the window.
struct SimBacklight {
    brightness: f32,
}

impl Backlight for SimBacklight {
    type Error = core::convert::Infallible;

    async fn set_level(&mut self, brightness: f32) -> Result<(), Self::Error> {
        info!("Backlight {:.0}%", brightness * 100.0);
        self.brightness = brightness.clamp(0.0, 1.0);
        Ok(())
    }
}

/// No audio; tones are logged.
struct SimBuzzer;

impl Buzzer for SimBuzzer {
    type Error = core::convert::Infallible;

    async fn beep(&mut self, tone: Tone) -> Result<(), Self::Error> {
        info!("Beep {:?} ({} Hz)", tone, tone.frequency_hz());
        Ok(())
    }
}

/// Stands in for the charge LED; only changes are logged.
struct SimStatusLight {
    rgb: Rgb888Triple,
}

impl StatusLight for SimStatusLight {
    type Error = core::convert::Infallible;

    async fn set_rgb(&mut self, rgb: Rgb888Triple) -> Result<(), Self::Error> {
        if rgb != self.rgb {
            info!("Status light {:?}", rgb);
            self.rgb = rgb;
        }
        Ok(())
    }
}

/// Copy `source` into `target` scaled by `brightness`.
fn dim_into(source: &SimulatorDisplay<Rgb565>, target: &mut SimulatorDisplay<Rgb565>, brightness: f32) {
    let pixels = source.bounding_box().points().map(|p| {
        let c = source.get_pixel(p);
        let scale = |v: u8| (v as f32 * brightness) as u8;
        Pixel(p, Rgb565::new(scale(c.r()), scale(c.g()), scale(c.b())))
    });
    let _ = target.draw_iter(pixels);
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

type FetchResult = Result<PriceSet, AppError>;

/// Fetch on a worker thread so the window keeps responding.
fn spawn_fetch(endpoint: String, offline: bool, tz: Tz) -> Receiver<FetchResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = if offline {
            Ok(synthetic_prices(Utc::now(), tz))
        } else {
            fetch_prices(&endpoint)
        };
        let _ = tx.send(result);
    });
    rx
}

fn fetch_prices(endpoint: &str) -> FetchResult {
    info!("GET {}", endpoint);
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| AppError::Http(error_message(&e)))?;
    let response = client
        .get(endpoint)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::Http(error_message(&e)))?;
    let body = response
        .bytes()
        .map_err(|e| AppError::Http(error_message(&e)))?;
    Ok(parse_unit_rates(&body)?)
}

/// Today's slots in local time with a cheap night and an evening peak.
fn synthetic_prices(now: DateTime<Utc>, tz: Tz) -> PriceSet {
    let midnight = now
        .with_timezone(&tz)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|t| t.and_local_timezone(tz).earliest())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(now);

    let slots = (0..SLOTS_PER_DAY)
        .map(|i| {
            let start = midnight + TimeDelta::minutes(30 * i as i64);
            let hour = i as f32 / 2.0;
            let base = 18.0 + 8.0 * ((hour - 9.0) / 24.0 * std::f32::consts::TAU).sin();
            let peak = if (16.0..19.0).contains(&hour) { 14.0 } else { 0.0 };
            let plunge = if (2.0..4.0).contains(&hour) { -14.0 } else { 0.0 };
            PriceSlot {
                start,
                end: start + TimeDelta::minutes(30),
                price: base + peak + plunge,
            }
        })
        .collect();
    PriceSet::from_slots(slots)
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Map an SDL keycode to a display request.
fn keycode_to_request(keycode: Keycode) -> Option<DisplayRequest> {
    match keycode {
        Keycode::Num1 | Keycode::Kp1 => Some(DisplayRequest::Navigate(PageId::Startup)),
        Keycode::Num2 | Keycode::Kp2 => Some(DisplayRequest::Navigate(PageId::Prices)),
        Keycode::Num3 | Keycode::Kp3 => Some(DisplayRequest::ShowError(AppError::Wifi(
            error_message(&format_args!("simulated failure")),
        ))),
        Keycode::R => Some(DisplayRequest::Redraw),
        _ => None,
    }
}

fn load_config_json() -> Option<String> {
    let path = std::env::var("AGILE_CONFIG").ok()?;
    match std::fs::read_to_string(&path) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("Could not read {}: {}", path, e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting agile-rs simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: 1=Startup  2=Prices  3=Error  R=Redraw  Q=Quit");

    let json = load_config_json();
    let config = match json.as_deref().map(Config::from_json) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("Ignoring config: {}", e);
            Config::new(InternetConfig::default(), TariffConfig::default())
        }
        None => Config::new(InternetConfig::default(), TariffConfig::default()),
    };
    let offline = std::env::var_os("AGILE_OFFLINE").is_some();
    let endpoint = match config.tariff.endpoint() {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let size = Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32);
    let mut manager = DisplayManager::new(
        SimulatorDisplay::<Rgb565>::new(size),
        config.timezone,
        config.bands,
    );
    let mut window_frame = SimulatorDisplay::<Rgb565>::new(size);

    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Agile Simulator", &output_settings);

    let mut controller = Controller::new(&config, DISPLAY_WIDTH_PX, embassy_time::Instant::now());
    let mut backlight = SimBacklight {
        brightness: controller.backlight().level().fraction(controller.backlight().max_level()),
    };
    let mut buzzer = SimBuzzer;
    let mut status_light = SimStatusLight { rgb: (0, 0, 0) };

    // The host is already online with a synchronised clock
    for step in [StartupStep::WifiConnected, StartupStep::TimeSynced] {
        let _ = manager.process_request(DisplayRequest::Startup(step));
    }

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(manager.display());

    let mut pending_fetch: Option<Receiver<FetchResult>> = None;
    let mut have_prices = false;
    let mut touch: Option<TouchPoint> = None;

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();
        let mut requests: Vec<DisplayRequest> = Vec::new();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                    if let Some(request) = keycode_to_request(keycode) {
                        requests.push(request);
                    }
                }
                SimulatorEvent::MouseButtonDown { point, .. } => {
                    touch = Some(TouchPoint::new(point.x.max(0) as u16, point.y.max(0) as u16));
                }
                SimulatorEvent::MouseButtonUp { .. } => touch = None,
                _ => {}
            }
        }

        // --- Fetch results ------------------------------------------------
        let now = Utc::now();
        if let Some(rx) = &pending_fetch {
            match rx.try_recv() {
                Ok(Ok(prices)) => {
                    pending_fetch = None;
                    requests.push(DisplayRequest::PricesUpdated(Box::new(prices.clone())));
                    controller.prices_updated(prices, now);
                    if !have_prices {
                        have_prices = true;
                        requests.push(DisplayRequest::Startup(StartupStep::PricesFetched));
                        requests.push(DisplayRequest::Navigate(PageId::Prices));
                    }
                }
                Ok(Err(e)) => {
                    pending_fetch = None;
                    warn!("Price fetch failed: {}", e);
                    controller.fetch_failed(now);
                    if !have_prices {
                        info!("Falling back to synthetic prices");
                        pending_fetch = Some(spawn_fetch(endpoint.clone(), true, config.timezone));
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => pending_fetch = None,
            }
        }

        // --- Controller ---------------------------------------------------
        let out = controller.tick(now, embassy_time::Instant::now(), touch);

        if out.fetch && pending_fetch.is_none() {
            pending_fetch = Some(spawn_fetch(endpoint.clone(), offline, config.timezone));
        }
        if let Some(tone) = out.tone {
            let _ = block_on(buzzer.beep(tone));
        }
        if let Some(command) = out.backlight {
            let max = controller.backlight().max_level();
            let _ = block_on(backlight.set_level(command.brightness(max)));
        }
        if let Some(rgb) = out.status_light {
            let _ = block_on(status_light.set_rgb(rgb));
        }
        if out.redraw {
            requests.push(DisplayRequest::Tick(now));
        }

        // --- Render -------------------------------------------------------
        for request in requests {
            if let Err(e) = manager.process_request(request) {
                error!("Draw error: {:?}", e);
            }
        }

        if backlight.brightness >= 1.0 {
            window.update(manager.display());
        } else {
            dim_into(manager.display(), &mut window_frame, backlight.brightness);
            window.update(&window_frame);
        }

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}

#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use alloc::boxed::Box;
use alloc::string::String;

use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::Blocking;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info, warn};
use static_cell::StaticCell;

// Display-LCD panel specific imports
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::options::ColorInversion;
use mipidsi::{Builder as MipidsiBuilder, NoResetPin, models::ILI9342CRgb565};

use agile_core::controller::Controller;
use agile_core::display_manager::{
    DisplayManager, DisplayRequest, DisplaySender, get_display_receiver, get_display_sender,
};
use agile_core::peripherals::{Backlight, Buzzer, SquareWaveBuzzer, StatusLight};
use agile_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, PageId, StartupStep};
use agile_firmware::app_state::{
    AppError, AppRunState, AppState, create_i2c_bus, init_i2c_hardware,
};
use agile_firmware::power::Pmic;
use agile_firmware::touch::TouchPanel;
use agile_firmware::wifi::{connection_task, net_task, wait_for_network};
use agile_firmware::wifi_secrets::device_config;
use agile_firmware::{http, sntp};

/// Touch and schedule poll period
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Show the error page if DHCP has not completed by then
const WIFI_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between SNTP attempts until the clock is set
const SNTP_RETRY: Duration = Duration::from_secs(10);

type PanelSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
type Panel = mipidsi::Display<SpiInterface<'static, PanelSpi, Output<'static>>, ILI9342CRgb565, NoResetPin>;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: StaticCell<$t> = StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}

#[embassy_executor::task]
async fn display_task(mut manager: DisplayManager<Panel>) {
    manager.run(get_display_receiver()).await
}

async fn show(sender: &DisplaySender<'static>, request: DisplayRequest) {
    sender.send(request).await;
}

/// Retry SNTP until the clock is set, reporting the first outcome on screen.
async fn sync_time(
    stack: Stack<'static>,
    server: &str,
    state: &mut AppState,
    sender: &DisplaySender<'static>,
) {
    state.advance(AppRunState::TimeSyncing);
    let mut reported = false;
    loop {
        match sntp::query(stack, server).await {
            Ok(unix_secs) => {
                state.set_time(unix_secs);
                show(sender, DisplayRequest::Startup(StartupStep::TimeSynced)).await;
                return;
            }
            Err(e) => {
                warn!("Time sync failed: {}", e);
                if !reported {
                    show(sender, DisplayRequest::Startup(StartupStep::TimeSyncFailed)).await;
                    reported = true;
                }
                Timer::after(SNTP_RETRY).await;
            }
        }
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);
    // Framebuffer and HTTPS buffers
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);
    info!("Embassy initialized!");

    let app_config = device_config();
    let endpoint: String = app_config
        .tariff
        .endpoint()
        .expect("Invalid tariff region in .env");
    let mut state = AppState::new();

    // Power rails first: the panel and touch controller hang off ALDO/BLDO
    let i2c = create_i2c_bus(peripherals.I2C0, peripherals.GPIO12, peripherals.GPIO11);
    let (hardware, touch_i2c) = init_i2c_hardware(i2c).await;
    let mut pmic = Pmic::new(hardware.power_mgmt);

    // 1. Configure SPI bus
    let spi_bus = Spi::new(peripherals.SPI2, SpiConfig::default())
        .expect("Failed to configure SPI2")
        .with_sck(peripherals.GPIO36)
        .with_mosi(peripherals.GPIO37);

    // 2. Create a dummy CS pin (we don't use hardware CS for this display)
    let cs = Output::new(peripherals.GPIO35, Level::High, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device = ExclusiveDevice::new_no_delay(spi_bus, cs).expect("SPI device");

    // 4. Set up DC (Data/Command) pin
    let dc = Output::new(peripherals.GPIO34, Level::Low, OutputConfig::default());

    // 5. Buffer for SPI batching, static so the display can move into a task
    let spi_buffer = mk_static!([u8; 512], [0u8; 512]);

    // 6. Create display interface
    let di = SpiInterface::new(spi_device, dc, spi_buffer);

    // 7. Build and initialize the display driver
    let display: Panel = MipidsiBuilder::new(ILI9342CRgb565, di)
        .display_size(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
        .invert_colors(ColorInversion::Inverted)
        .init(&mut embassy_time::Delay)
        .expect("Failed to initialize display");
    info!("Display initialized!");

    let manager = DisplayManager::new(display, app_config.timezone, app_config.bands);
    spawner.spawn(display_task(manager).expect("display task"));
    let sender = get_display_sender();

    let mut controller = Controller::new(&app_config, DISPLAY_WIDTH_PX, Instant::now());
    let brightness = controller
        .backlight()
        .level()
        .fraction(controller.backlight().max_level());
    if let Err(e) = pmic.set_level(brightness).await {
        warn!("Backlight: {}", e);
    }

    let mut touch = TouchPanel::new(touch_i2c);
    if let Err(e) = touch.init().await {
        warn!("Touch controller init failed: {}", e);
    }

    let buzzer_pin = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let mut buzzer = SquareWaveBuzzer::new(buzzer_pin, embassy_time::Delay);

    // WiFi
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let radio_init = mk_static!(
        esp_radio::Controller<'static>,
        esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller")
    );
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(StackResources<4>, StackResources::<4>::new()),
        seed,
    );

    state.advance(AppRunState::WifiConnecting);
    spawner.spawn(
        connection_task(
            wifi_controller,
            app_config.internet.ssid,
            app_config.internet.password,
        )
        .expect("wifi task"),
    );
    spawner.spawn(net_task(runner).expect("net task"));

    if let Err(e) = wait_for_network(stack, WIFI_TIMEOUT).await {
        error!("{}", e);
        state.advance(AppRunState::Error);
        show(&sender, DisplayRequest::ShowError(e)).await;
        // The connection task keeps retrying
        stack.wait_config_up().await;
        show(&sender, DisplayRequest::Navigate(PageId::Startup)).await;
    }
    state.advance(AppRunState::WifiConnected);
    show(&sender, DisplayRequest::Startup(StartupStep::WifiConnected)).await;

    sync_time(stack, app_config.ntp_server, &mut state, &sender).await;

    let mut have_prices = false;

    loop {
        let uptime = Instant::now();

        let touch_point = match touch.primary_point().await {
            Ok(point) => point,
            Err(e) => {
                warn!("Touch read failed: {}", e);
                None
            }
        };

        let Some(now) = state.clock.now(uptime) else {
            Timer::after(POLL_INTERVAL).await;
            continue;
        };

        let out = controller.tick(now, uptime, touch_point);

        if let Some(tone) = out.tone
            && let Err(e) = buzzer.beep(tone).await
        {
            warn!("Buzzer: {:?}", e);
        }

        if let Some(command) = out.backlight {
            let max = controller.backlight().max_level();
            if let Err(e) = pmic.set_level(command.brightness(max)).await {
                warn!("Backlight: {}", e);
            }
        }

        if out.fetch {
            state.advance(AppRunState::FetchingPrices);
            match http::fetch_prices(stack, &endpoint, seed ^ uptime.as_ticks()).await {
                Ok(prices) => {
                    show(&sender, DisplayRequest::PricesUpdated(Box::new(prices.clone()))).await;
                    controller.prices_updated(prices, now);
                    if !have_prices {
                        have_prices = true;
                        show(&sender, DisplayRequest::Startup(StartupStep::PricesFetched)).await;
                        show(&sender, DisplayRequest::Navigate(PageId::Prices)).await;
                    }
                }
                Err(e) => {
                    error!("Price fetch failed: {}", e);
                    controller.fetch_failed(now);
                }
            }
            state.advance(AppRunState::Running);
        }

        if out.redraw {
            show(&sender, DisplayRequest::Tick(now)).await;
        }

        if let Some(rgb) = out.status_light
            && let Err(e) = pmic.set_rgb(rgb).await
        {
            warn!("Status light: {}", e);
        }

        Timer::after(POLL_INTERVAL).await;
    }
}

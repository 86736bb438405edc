//! Hardware initialization for the CoreS3
//!
//! Sets up the internal I2C bus and the chips on it in dependency order:
//! the AXP2101 must power the display and touch rails before anything else
//! is talked to.

use agile_core::input::SharedI2cDevice;
use axp2101_embedded::AsyncAxp2101;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use esp_hal::{i2c::master::Config as I2cConfig, time::Rate};
use log::{info, warn};
use static_cell::StaticCell;

pub type I2cBus = esp_hal::i2c::master::I2c<'static, esp_hal::Async>;
pub type SharedI2c = SharedI2cDevice<'static, I2cBus>;

/// AW9523 pin wired to the touch controller interrupt (P1_2)
const TOUCH_INT_PIN: u8 = 10;

const AW9523_ADDR: u8 = 0x58;

/// Display and touch rail
const ALDO4_MILLIVOLTS: u16 = 3300;

/// Container for I2C-based hardware components
pub struct I2cHardware {
    pub power_mgmt: AsyncAxp2101<SharedI2c>,
    pub gpio_expander: aw9523_embedded::r#async::Aw9523Async<
        embedded_hal::i2c::SevenBitAddress,
        SharedI2c,
    >,
}

/// Create the internal I2C bus (400 kHz)
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO12<'static>,
    scl: esp_hal::peripherals::GPIO11<'static>,
) -> I2cBus {
    esp_hal::i2c::master::I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("Failed to configure I2C0")
    .with_sda(sda)
    .with_scl(scl)
    .into_async()
}

/// Power up the rails and configure the expander.
///
/// Returns the initialized chips and a bus handle for the touch controller.
pub async fn init_i2c_hardware(i2c0: I2cBus) -> (I2cHardware, SharedI2c) {
    static I2C0_BUS: StaticCell<AsyncMutex<CriticalSectionRawMutex, I2cBus>> = StaticCell::new();
    let i2c0_bus = I2C0_BUS.init(AsyncMutex::new(i2c0));

    info!("Configuring power management");
    let mut power_mgmt = AsyncAxp2101::new(SharedI2cDevice::new(i2c0_bus));
    match power_mgmt.init().await {
        Ok(_) => info!("Power management ready"),
        Err(e) => warn!("Power init failed: {:?}", e),
    }

    // The charge LED doubles as the price status light; start dark
    if let Err(e) = power_mgmt
        .set_charging_led_mode(axp2101_embedded::ChargeLedMode::Off)
        .await
    {
        warn!("Charge LED setup failed: {:?}", e);
    }

    power_mgmt.enable_aldo1().await.expect("ALDO1");
    power_mgmt.enable_aldo2().await.expect("ALDO2");
    power_mgmt.enable_aldo3().await.expect("ALDO3");
    power_mgmt.enable_aldo4().await.expect("ALDO4");
    power_mgmt.enable_bldo1().await.expect("BLDO1");
    power_mgmt.enable_bldo2().await.expect("BLDO2");
    // DLDO1 feeds the backlight
    power_mgmt.enable_dldo1().await.expect("DLDO1");
    power_mgmt
        .set_aldo4_voltage(ALDO4_MILLIVOLTS)
        .await
        .expect("ALDO4 voltage");

    info!("Configuring GPIO expander...");
    let mut gpio_expander =
        aw9523_embedded::r#async::Aw9523Async::new(SharedI2cDevice::new(i2c0_bus), AW9523_ADDR);
    gpio_expander.init().await.expect("AW9523 init");
    gpio_expander
        .pin_mode(TOUCH_INT_PIN, aw9523_embedded::PinMode::Input)
        .await
        .expect("AW9523 touch interrupt pin");
    gpio_expander
        .enable_interrupt(TOUCH_INT_PIN, true)
        .await
        .expect("AW9523 touch interrupt");
    info!("GPIO expander ready");

    let hardware = I2cHardware {
        power_mgmt,
        gpio_expander,
    };
    (hardware, SharedI2cDevice::new(i2c0_bus))
}

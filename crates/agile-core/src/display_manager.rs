//! Display manager for page switching and rendering
//!
//! This module provides a channel-driven display task that:
//! - Owns the current page and switches between pages on request
//! - Forwards price and clock updates to whichever page is showing
//! - Draws into a RAM framebuffer and flushes only the changed region

use alloc::boxed::Box;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, error, info};

use crate::app_state::AppError;
use crate::config::PriceBands;
use crate::framebuffer::FrameBuffer;
use crate::pages::{ErrorPage, Page, PageWrapper, PricesPage, StartupPage};
use crate::tariff::PriceSet;
use crate::ui::core::{PageEvent, PageId, StartupStep};

/// Channel capacity for display requests
pub const DISPLAY_CHANNEL_CAPACITY: usize = 4;

pub type DisplayReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, DisplayRequest, DISPLAY_CHANNEL_CAPACITY>;
pub type DisplaySender<'a> =
    Sender<'a, CriticalSectionRawMutex, DisplayRequest, DISPLAY_CHANNEL_CAPACITY>;

/// Request to change the current page or update what it shows
#[derive(Debug, Clone)]
pub enum DisplayRequest {
    /// Navigate to a specific page
    Navigate(PageId),
    /// Append a boot milestone to the start-up log
    Startup(StartupStep),
    /// New unit rates
    PricesUpdated(Box<PriceSet>),
    /// Current wall-clock time, sent whenever the screen should be redrawn
    Tick(DateTime<Utc>),
    /// Switch to the error page for this error
    ShowError(AppError),
    /// Force a redraw of the current page
    Redraw,
}

/// Global channel for display requests
pub static DISPLAY_CHANNEL: Channel<
    CriticalSectionRawMutex,
    DisplayRequest,
    DISPLAY_CHANNEL_CAPACITY,
> = Channel::new();

/// Owns the panel and the active page
pub struct DisplayManager<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    display: D,
    framebuffer: FrameBuffer,
    current_page: PageWrapper,
    timezone: Tz,
    bands: PriceBands,
    /// Latest prices and time, handed to the price page when it is created
    prices: Option<Box<PriceSet>>,
    now: Option<DateTime<Utc>>,
}

impl<D> DisplayManager<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Start on the start-up page
    pub fn new(display: D, timezone: Tz, bands: PriceBands) -> Self {
        let mut framebuffer = FrameBuffer::new();
        // The panel content is unknown after reset
        framebuffer.invalidate();

        Self {
            display,
            framebuffer,
            current_page: PageWrapper::Startup(Box::new(StartupPage::new())),
            timezone,
            bands,
            prices: None,
            now: None,
        }
    }

    pub fn current_page(&self) -> PageId {
        self.current_page.id()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn navigate_to(&mut self, page_id: PageId) {
        debug!("Navigating to page: {:?}", page_id);
        self.current_page = match page_id {
            PageId::Startup => PageWrapper::Startup(Box::new(StartupPage::new())),
            PageId::Prices => PageWrapper::Prices(Box::new(
                PricesPage::new(self.timezone, self.bands)
                    .with_state(self.prices.clone(), self.now),
            )),
            PageId::Error => PageWrapper::Error(Box::new(ErrorPage::new(
                "Unknown error",
                "Restart the device",
            ))),
        };
        self.current_page.on_activate();
    }

    fn show_error(&mut self, error: &AppError) {
        error!("Showing error page: {}", error);
        self.current_page = PageWrapper::Error(Box::new(ErrorPage::from_error(error)));
        self.current_page.on_activate();
    }

    fn dispatch(&mut self, event: PageEvent) {
        if self.current_page.on_event(&event) {
            debug!("{} marked for redraw", self.current_page.title());
        }
    }

    /// Draw the page into the framebuffer if it changed, then flush.
    fn render(&mut self) -> Result<(), D::Error> {
        if self.current_page.is_dirty() {
            debug!("Rendering {}", self.current_page.title());
            if let Err(never) = self.current_page.draw_page(&mut self.framebuffer) {
                match never {}
            }
            self.current_page.mark_clean();
        }
        self.framebuffer.flush(&mut self.display)
    }

    /// Apply one request and render the result
    pub fn process_request(&mut self, request: DisplayRequest) -> Result<(), D::Error> {
        match request {
            DisplayRequest::Navigate(page_id) => self.navigate_to(page_id),
            DisplayRequest::Startup(step) => self.dispatch(PageEvent::Startup(step)),
            DisplayRequest::PricesUpdated(prices) => {
                self.prices = Some(prices.clone());
                self.dispatch(PageEvent::PricesUpdated(prices));
            }
            DisplayRequest::Tick(now) => {
                self.now = Some(now);
                self.dispatch(PageEvent::Tick(now));
            }
            DisplayRequest::ShowError(error) => self.show_error(&error),
            DisplayRequest::Redraw => self.current_page.mark_dirty(),
        }

        self.render()
    }

    /// Drain whatever is queued without waiting, for hosts that run their
    /// own event loop.
    pub fn process_pending(&mut self, receiver: &DisplayReceiver<'_>) -> Result<(), D::Error> {
        while let Ok(request) = receiver.try_receive() {
            self.process_request(request)?;
        }
        self.render()
    }

    /// Run the display manager task
    pub async fn run(&mut self, receiver: DisplayReceiver<'_>)
    where
        <D as DrawTarget>::Error: core::fmt::Debug,
    {
        info!("Display manager task started");

        if let Err(e) = self.render() {
            error!("Display render error: {:?}", e);
        }

        loop {
            let request = receiver.receive().await;
            if let Err(e) = self.process_request(request) {
                error!("Error processing display request: {:?}", e);
            }
        }
    }
}

/// Helper to get a display request sender
pub fn get_display_sender() -> DisplaySender<'static> {
    DISPLAY_CHANNEL.sender()
}

/// Helper to get a display request receiver
pub fn get_display_receiver() -> DisplayReceiver<'static> {
    DISPLAY_CHANNEL.receiver()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntp::NtpError;
    use crate::tariff::PriceSlot;
    use crate::ui::styling::BLACK;
    use alloc::vec::Vec;
    use chrono::{TimeDelta, TimeZone};

    fn manager() -> DisplayManager<FrameBuffer> {
        DisplayManager::new(FrameBuffer::new(), Tz::Europe__London, PriceBands::default())
    }

    fn prices() -> Box<PriceSet> {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let slots: Vec<PriceSlot> = (0..48)
            .map(|i| {
                let s = start + TimeDelta::minutes(30 * i);
                PriceSlot {
                    start: s,
                    end: s + TimeDelta::minutes(30),
                    price: 20.0,
                }
            })
            .collect();
        Box::new(PriceSet::from_slots(slots))
    }

    fn lit_pixels(fb: &FrameBuffer) -> usize {
        (0..240)
            .flat_map(|y| (0..320).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) != Some(BLACK))
            .count()
    }

    #[test]
    fn test_starts_on_startup_page() {
        let mut m = manager();
        assert_eq!(m.current_page(), PageId::Startup);
        m.process_request(DisplayRequest::Redraw).unwrap();
        assert!(lit_pixels(m.display()) > 0);
    }

    #[test]
    fn test_prices_page_gets_remembered_state() {
        let mut m = manager();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 5, 0).unwrap();
        m.process_request(DisplayRequest::PricesUpdated(prices())).unwrap();
        m.process_request(DisplayRequest::Tick(now)).unwrap();
        m.process_request(DisplayRequest::Navigate(PageId::Prices)).unwrap();
        assert_eq!(m.current_page(), PageId::Prices);

        match &m.current_page {
            PageWrapper::Prices(page) => assert_eq!(page.surrounding().current, 20.0),
            _ => panic!("expected prices page"),
        }
    }

    #[test]
    fn test_show_error_switches_page() {
        let mut m = manager();
        m.process_request(DisplayRequest::ShowError(AppError::TimeSync(NtpError::Timeout)))
            .unwrap();
        assert_eq!(m.current_page(), PageId::Error);
        assert!(!m.current_page.is_dirty());
    }

    #[test]
    fn test_clean_page_is_not_redrawn() {
        let mut m = manager();
        m.process_request(DisplayRequest::Redraw).unwrap();
        assert!(!m.current_page.is_dirty());
        // A tick means nothing to the start-up page
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 5, 0).unwrap();
        m.process_request(DisplayRequest::Tick(now)).unwrap();
        assert!(!m.current_page.is_dirty());
        assert_eq!(m.framebuffer.dirty_area(), None);
    }

    #[test]
    fn test_process_pending_drains_channel() {
        let channel: Channel<CriticalSectionRawMutex, DisplayRequest, DISPLAY_CHANNEL_CAPACITY> =
            Channel::new();
        let mut m = manager();
        channel
            .try_send(DisplayRequest::Startup(StartupStep::WifiConnected))
            .unwrap();
        channel
            .try_send(DisplayRequest::Navigate(PageId::Prices))
            .unwrap();
        m.process_pending(&channel.receiver()).unwrap();
        assert_eq!(m.current_page(), PageId::Prices);
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_run_handles_queued_request() {
        let channel: Channel<CriticalSectionRawMutex, DisplayRequest, DISPLAY_CHANNEL_CAPACITY> =
            Channel::new();
        let mut m = manager();
        channel
            .try_send(DisplayRequest::Navigate(PageId::Error))
            .unwrap();

        // `run` never returns; poll it once so it consumes the queue
        let receiver = channel.receiver();
        let mut task = core::pin::pin!(m.run(receiver));
        let waker = core::task::Waker::noop();
        let mut cx = core::task::Context::from_waker(waker);
        assert!(task.as_mut().poll(&mut cx).is_pending());
        assert!(channel.try_receive().is_err());
    }
}

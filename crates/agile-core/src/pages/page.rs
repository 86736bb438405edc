//! Page abstraction and enum dispatch
//!
//! [`Page`] is the contract every screen implements: react to
//! [`PageEvent`]s, track whether it needs drawing, and draw itself.
//! [`PageWrapper`] holds one of the concrete pages so the display manager
//! can switch between them without trait objects.

use alloc::boxed::Box;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::pages::{ErrorPage, PricesPage, StartupPage};
use crate::ui::core::{PageEvent, PageId};

pub trait Page {
    /// Unique identifier used for navigation and lookup.
    fn id(&self) -> PageId;

    /// Human-readable title for logs.
    fn title(&self) -> &str;

    /// Called once when this page becomes the active page.
    fn on_activate(&mut self) {
        self.mark_dirty();
    }

    /// Handle an incoming event. Returns `true` if the page needs a redraw.
    fn on_event(&mut self, _event: &PageEvent) -> bool {
        false
    }

    /// Render the entire page to the given display target.
    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D)
    -> Result<(), D::Error>;

    /// Bounding rectangle of this page (typically the full screen).
    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);
}

/// One of the concrete pages, boxed to keep the enum small.
pub enum PageWrapper {
    Startup(Box<StartupPage>),
    Prices(Box<PricesPage>),
    Error(Box<ErrorPage>),
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Startup(page) => page.id(),
            PageWrapper::Prices(page) => page.id(),
            PageWrapper::Error(page) => page.id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            PageWrapper::Startup(page) => page.title(),
            PageWrapper::Prices(page) => page.title(),
            PageWrapper::Error(page) => page.title(),
        }
    }

    fn on_activate(&mut self) {
        match self {
            PageWrapper::Startup(page) => page.on_activate(),
            PageWrapper::Prices(page) => page.on_activate(),
            PageWrapper::Error(page) => page.on_activate(),
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match self {
            PageWrapper::Startup(page) => page.on_event(event),
            PageWrapper::Prices(page) => page.on_event(event),
            PageWrapper::Error(page) => page.on_event(event),
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        match self {
            PageWrapper::Startup(page) => page.draw_page(display),
            PageWrapper::Prices(page) => page.draw_page(display),
            PageWrapper::Error(page) => page.draw_page(display),
        }
    }

    fn bounds(&self) -> Rectangle {
        match self {
            PageWrapper::Startup(page) => page.bounds(),
            PageWrapper::Prices(page) => page.bounds(),
            PageWrapper::Error(page) => page.bounds(),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            PageWrapper::Startup(page) => page.is_dirty(),
            PageWrapper::Prices(page) => page.is_dirty(),
            PageWrapper::Error(page) => page.is_dirty(),
        }
    }

    fn mark_clean(&mut self) {
        match self {
            PageWrapper::Startup(page) => page.mark_clean(),
            PageWrapper::Prices(page) => page.mark_clean(),
            PageWrapper::Error(page) => page.mark_clean(),
        }
    }

    fn mark_dirty(&mut self) {
        match self {
            PageWrapper::Startup(page) => page.mark_dirty(),
            PageWrapper::Prices(page) => page.mark_dirty(),
            PageWrapper::Error(page) => page.mark_dirty(),
        }
    }
}

//! RAM framebuffer with per-pixel change detection.
//!
//! Pages draw into this buffer rather than the SPI panel. Once a frame is
//! complete only the bounding box of changed pixels is sent to the panel,
//! so the once-a-minute redraw of the clock and chart costs a fraction of a
//! full-screen transfer.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Heap-allocated `DrawTarget<Color = Rgb565>` that remembers what changed.
///
/// 320x240 costs 153,600 bytes, which lands in PSRAM on the device.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Buffer the size of the panel, filled with black.
    pub fn new() -> Self {
        Self::with_size(DISPLAY_WIDTH_PX as usize, DISPLAY_HEIGHT_PX as usize)
    }

    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width * height],
            dirty: None,
        }
    }

    /// Colour at a pixel, `None` outside the buffer
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width + x as usize])
    }

    /// Region that the next flush would send
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    /// Mark the whole buffer as changed, e.g. after the panel was reset.
    pub fn invalidate(&mut self) {
        if self.width > 0 && self.height > 0 {
            self.dirty = Some(DirtyRect {
                min_x: 0,
                min_y: 0,
                max_x: self.width - 1,
                max_y: self.height - 1,
            });
        }
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Send the changed region to `display` in one `fill_contiguous` call,
    /// then reset the dirty state. No-op when nothing changed.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let area = rect.to_rectangle();
        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        // Shared borrow of the pixels so the iterator does not capture `self`
        let pixels = &self.pixels;
        let stride = self.width;
        let width = area.size.width as usize;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (x, y) = (coord.x, coord.y);
            if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let mut colors = colors.into_iter();
        for row in 0..area.size.height as i32 {
            let y = area.top_left.y + row;
            for col in 0..area.size.width as i32 {
                let x = area.top_left.x + col;
                // Consume the colour even when clipped so rows stay aligned
                if let Some(color) = colors.next()
                    && x >= 0
                    && y >= 0
                    && (x as usize) < self.width
                    && (y as usize) < self.height
                {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y as usize..=bottom_right.y as usize {
            for x in area.top_left.x as usize..=bottom_right.x as usize {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn test_unchanged_pixels_stay_clean() {
        let mut fb = FrameBuffer::with_size(16, 16);
        fb.clear(Rgb565::BLACK).unwrap();
        assert_eq!(fb.dirty_area(), None);
    }

    #[test]
    fn test_dirty_area_covers_changes() {
        let mut fb = FrameBuffer::with_size(32, 32);
        Pixel(Point::new(3, 4), Rgb565::RED).draw(&mut fb).unwrap();
        Pixel(Point::new(10, 2), Rgb565::RED).draw(&mut fb).unwrap();
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(3, 2), Size::new(8, 3)))
        );
    }

    #[test]
    fn test_fill_solid_clips_to_buffer() {
        let mut fb = FrameBuffer::with_size(8, 8);
        Rectangle::new(Point::new(-2, 6), Size::new(5, 5))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.pixel(0, 7), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(2, 6), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(3, 6), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(0, 8), None);
    }

    #[test]
    fn test_flush_sends_only_dirty_region() {
        let mut fb = FrameBuffer::with_size(16, 16);
        Pixel(Point::new(1, 1), Rgb565::RED).draw(&mut fb).unwrap();
        Pixel(Point::new(2, 2), Rgb565::BLUE).draw(&mut fb).unwrap();

        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        fb.flush(&mut display).unwrap();

        assert_eq!(display.get_pixel(Point::new(1, 1)), Some(Rgb565::RED));
        assert_eq!(display.get_pixel(Point::new(2, 1)), Some(Rgb565::BLACK));
        assert_eq!(display.get_pixel(Point::new(2, 2)), Some(Rgb565::BLUE));
        assert_eq!(display.get_pixel(Point::new(0, 0)), None);
        assert_eq!(fb.dirty_area(), None);
    }
}

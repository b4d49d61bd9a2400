// The framebuffer view: VRAM is a 256x224 1bpp bitmap, column-major, that the
// real cabinet displays through a CRT rotated 90 degrees. `Surface` is the
// pixel sink the core renders into; `MinifbSurface` is the one concrete
// adapter this crate ships, mirroring how the teacher codebase's `Monitor`
// device owns a `minifb::Window` directly rather than going through a trait.

use crate::memory::Memory;
use minifb::{Window, WindowOptions};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 224;

/// Accepts `(x, y, r, g, b)` pixel writes in rotated (upright) screen space.
pub trait Surface {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8);
    fn present(&mut self);
}

/// Bands from the original cabinet's screen overlay: a red strip at the top,
/// a blue strip at the bottom, white everywhere else.
fn band_color(row: usize) -> (u8, u8, u8) {
    if row < SCREEN_HEIGHT / 5 {
        (255, 0, 0)
    } else if row > SCREEN_HEIGHT - SCREEN_HEIGHT / 10 {
        (0, 0, 255)
    } else {
        (255, 255, 255)
    }
}

/// Walks every bit of the VRAM window, plotting the 90-degree-rotated pixel
/// into `surface`. `scale` repeats each logical pixel into a `scale x scale`
/// block of physical pixels.
pub fn render(memory: &Memory, scale: usize, surface: &mut dyn Surface) {
    let vram = memory.vram();
    for (i, &byte) in vram.iter().enumerate() {
        let column = i / (SCREEN_HEIGHT / 8);
        let row_byte = i % (SCREEN_HEIGHT / 8);
        for bit in 0..8 {
            let row = row_byte * 8 + bit;
            let set = byte & (1 << bit) != 0;
            let (r, g, b) = if set { band_color(row) } else { (0, 0, 0) };
            let dx = column * scale;
            let dy = (SCREEN_HEIGHT - 1 - row) * scale;
            for sx in 0..scale {
                for sy in 0..scale {
                    surface.set_pixel(dx + sx, dy + sy, r, g, b);
                }
            }
        }
    }
    surface.present();
}

pub struct MinifbSurface {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbSurface {
    pub fn new(title: &str, scale: usize) -> anyhow::Result<Self> {
        let width = SCREEN_WIDTH * scale;
        let height = SCREEN_HEIGHT * scale;
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| anyhow::anyhow!("failed to open display window: {}", e))?;
        Ok(MinifbSurface { window, buffer: vec![0; width * height], width, height })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

impl Surface for MinifbSurface {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let packed = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        self.buffer[y * self.width + x] = packed;
    }

    fn present(&mut self) {
        if let Err(e) = self.window.update_with_buffer(&self.buffer, self.width, self.height) {
            log::error!("failed to present frame: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSurface {
        writes: Vec<(usize, usize, u8, u8, u8)>,
        presented: bool,
    }

    impl Surface for RecordingSurface {
        fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
            self.writes.push((x, y, r, g, b));
        }
        fn present(&mut self) {
            self.presented = true;
        }
    }

    #[test]
    fn render_plots_a_set_bit_and_leaves_clear_bits_black() {
        let mut memory = Memory::new();
        memory.load(0x2400, &[0b0000_0001]);
        let mut surface = RecordingSurface { writes: Vec::new(), presented: false };
        render(&memory, 1, &mut surface);
        assert!(surface.presented);
        let set_pixel = surface.writes.iter().find(|(_, _, r, g, b)| *r != 0 || *g != 0 || *b != 0);
        assert!(set_pixel.is_some());
    }

    #[test]
    fn top_band_is_red_and_bottom_band_is_blue() {
        assert_eq!(band_color(0), (255, 0, 0));
        assert_eq!(band_color(SCREEN_HEIGHT - 1), (0, 0, 255));
        assert_eq!(band_color(SCREEN_HEIGHT / 2), (255, 255, 255));
    }
}

use log::debug;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{TextureValueError, UpdateTextureError};
use sdl2::video::WindowBuildError;
use sdl2::IntegerOrSdlError;
use thiserror::Error;

use chip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_core::FrameBuffer;

/// Bytes per RGB24 pixel
const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sdl2 error: {0}")]
    Sdl(String),
    #[error("unable to open window: {0}")]
    Window(#[from] WindowBuildError),
    #[error("unable to create canvas: {0}")]
    Canvas(#[from] IntegerOrSdlError),
    #[error("unable to create texture: {0}")]
    Texture(#[from] TextureValueError),
    #[error("unable to update texture: {0}")]
    Update(#[from] UpdateTextureError),
}

/// The colours lit and unlit cells are drawn with
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub on: [u8; 3],
    pub off: [u8; 3],
}

impl Default for Palette {
    /// Green phosphor
    fn default() -> Self {
        Palette {
            on: [0x00, 0xFF, 0x99],
            off: [0x00, 0x1A, 0x0F],
        }
    }
}

/// # Display
/// The Chip-8 display is composed of 64x32 monochrome pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array of 64x32 cells.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
    palette: Palette,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, DisplayError> {
        let video_subsystem = sdl.video().map_err(DisplayError::Sdl)?;
        let window = video_subsystem
            .window(
                "Chip-8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .resizable()
            .build()?;
        let canvas = window.into_canvas().build()?;
        debug!("opened {}x scaled display", scale);

        Ok(Display {
            canvas,
            palette: Palette::default(),
        })
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 RGB24 texture is a 1D array of bytes that represent concatenated rows of
    /// RGB pixels, so each cell of the frame becomes the 3 bytes of its palette colour.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    /// * `palette` the colours to paint lit and unlit cells with
    fn frame_to_sdl_texture(frame: &FrameBuffer, palette: &Palette) -> Vec<u8> {
        frame
            .iter()
            .flat_map(|row| row.iter())
            .flat_map(|&cell| {
                let colour = if cell == 1 { palette.on } else { palette.off };
                colour.to_vec()
            })
            .collect()
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            DISPLAY_WIDTH as u32,
            DISPLAY_HEIGHT as u32,
        )?;

        let pixels = Display::frame_to_sdl_texture(frame, &self.palette);
        texture.update(None, &pixels, DISPLAY_WIDTH * BYTES_PER_PIXEL)?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(DisplayError::Sdl)?;
        self.canvas.present();
        Ok(())
    }
}

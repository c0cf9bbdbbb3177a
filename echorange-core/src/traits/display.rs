//! Display collaborator trait
//!
//! The ranging pipeline treats the display as an opaque rendering sink.
//! Drawing calls only touch a frame buffer; `present` pushes the finished
//! frame to the panel.

/// Errors that can occur while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer to the panel failed
    Communication,
    /// Coordinates fall outside anything the panel can show
    InvalidCoordinates,
    /// Panel has not been initialized
    NotInitialized,
}

/// Rendering sink for ranging frames
///
/// Coordinates are in pixels with the origin at the top-left corner.
/// Implementations clip anything drawn outside the panel.
#[allow(async_fn_in_trait)]
pub trait RangeDisplay {
    /// Clear the frame buffer
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text with its top-left corner at `(x, y)`
    ///
    /// - `scale`: 1 for the small font, 2 for the large font
    fn draw_text(&mut self, x: i32, y: i32, scale: u8, text: &str) -> Result<(), DisplayError>;

    /// Draw a one pixel wide line between two points (inclusive)
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), DisplayError>;

    /// Send the frame buffer to the panel
    async fn present(&mut self) -> Result<(), DisplayError>;

    /// Panel width in pixels
    fn width(&self) -> u16;
}

//! Frame value type and the capture collaborator contract.

/// One video frame in packed RGB, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Packed RGB pixel data, `width * height * 3` bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// (height, width), the shape convention the action classifier takes.
    #[inline]
    pub fn shape(&self) -> (u32, u32) {
        (self.height, self.width)
    }
}

/// Lazy sequence of frames: a file, a live device, or a test fixture.
///
/// `Ok(None)` signals a finite source running out; live sources simply
/// never return it. Any producer-side threading, queueing, or drop
/// policy stays behind this trait.
pub trait FrameSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

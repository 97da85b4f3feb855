//! Output boundary: annotated frames as a multipart byte stream.
//!
//! Each processed frame is re-encoded (typically JPEG) and framed as
//! one `multipart/x-mixed-replace` chunk, the contract MJPEG-over-HTTP
//! consumers expect. Encoding failure is fatal for the stream session.

use std::io::Write;

use crate::error::Error;
use crate::pipeline::frame::Frame;

/// Image encoder collaborator turning a frame into compressed bytes.
pub trait FrameEncoder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode(&mut self, frame: &Frame) -> Result<Vec<u8>, Self::Error>;
}

/// Writes encoded frames as multipart chunks to a byte sink.
pub struct MultipartStream<W: Write> {
    writer: W,
    boundary: &'static str,
    content_type: &'static str,
}

impl<W: Write> MultipartStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            boundary: "frame",
            content_type: "image/jpeg",
        }
    }

    /// Encode one frame and write it as a chunk. An encoder error maps
    /// to [`Error::Encode`] and must end the session.
    pub fn send_frame<E: FrameEncoder>(
        &mut self,
        encoder: &mut E,
        frame: &Frame,
    ) -> Result<(), Error> {
        let payload = encoder.encode(frame).map_err(Error::encode)?;
        self.write_chunk(&payload)
    }

    /// Write one already-encoded payload as a multipart chunk.
    pub fn write_chunk(&mut self, payload: &[u8]) -> Result<(), Error> {
        write!(
            self.writer,
            "--{}\r\nContent-Type: {}\r\n\r\n",
            self.boundary, self.content_type
        )?;
        self.writer.write_all(payload)?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_framing() {
        let mut stream = MultipartStream::new(Vec::new());
        stream.write_chunk(b"abc").unwrap();
        let bytes = stream.into_inner();
        assert_eq!(
            bytes,
            b"--frame\r\nContent-Type: image/jpeg\r\n\r\nabc\r\n"
        );
    }

    #[test]
    fn test_encoder_failure_is_fatal() {
        struct FailingEncoder;
        impl FrameEncoder for FailingEncoder {
            type Error = std::io::Error;
            fn encode(&mut self, _frame: &Frame) -> Result<Vec<u8>, Self::Error> {
                Err(std::io::Error::other("codec rejected frame"))
            }
        }

        let mut stream = MultipartStream::new(Vec::new());
        let frame = Frame::new(vec![0; 12], 2, 2);
        let err = stream.send_frame(&mut FailingEncoder, &frame).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }
}

//! A camera backed by an image file on disk.
//!
//! The CLI has no live video device, so the frame comes from a file the
//! user points at. An unreadable file is reported the same way a browser
//! reports a refused camera.

use std::path::PathBuf;

use async_trait::async_trait;
use rollcall::{Camera, CameraStream, CaptureError, Frame, StreamConstraints};

pub struct FileStillCamera {
    path: PathBuf,
}

impl FileStillCamera {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Camera for FileStillCamera {
    async fn open(
        &self,
        _constraints: StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CaptureError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CaptureError::CameraAccessDenied {
                reason: format!("cannot read {}: {e}", self.path.display()),
            })?;
        let frame = Frame {
            data,
            mime_type: mime_for(&self.path).to_string(),
        };
        Ok(Box::new(FileStillStream { frame }))
    }
}

struct FileStillStream {
    frame: Frame,
}

#[async_trait]
impl CameraStream for FileStillStream {
    async fn still_frame(&mut self) -> Result<Frame, CaptureError> {
        Ok(self.frame.clone())
    }
}

fn mime_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

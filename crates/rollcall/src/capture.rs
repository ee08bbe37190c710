//! Camera capture state machine.
//!
//! [`CaptureSession`] moves through three states: idle, camera active, and
//! frame captured. Holding the live stream inside the active state and the
//! frame inside the captured state makes the two impossible to observe at
//! once; capturing a frame closes the stream in the same transition.
//!
//! The camera, the submission endpoint, and user notification are all
//! injected, so the flow runs headless in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::CaptureError;
use crate::notify::UserNotifier;

/// Constraints for requesting a media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for StreamConstraints {
    /// Video input, no audio.
    fn default() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// A single encoded still frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// MIME type of the encoding.
    pub mime_type: String,
}

impl Frame {
    /// A JPEG frame, the encoding cameras produce by default.
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: "image/jpeg".to_string(),
        }
    }
}

/// Device seam producing live camera streams.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Request a live stream. A refusal of any kind surfaces as
    /// [`CaptureError::CameraAccessDenied`].
    async fn open(&self, constraints: StreamConstraints)
        -> Result<Box<dyn CameraStream>, CaptureError>;
}

/// A live camera stream. Dropping it releases the device.
#[async_trait]
pub trait CameraStream: Send {
    /// Grab one encoded still frame.
    async fn still_frame(&mut self) -> Result<Frame, CaptureError>;
}

/// A completed submission: one frame and one attendance code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSubmission {
    pub image: Frame,
    pub code: String,
}

impl AttendanceSubmission {
    /// Both parts are required; an empty code is refused here so it never
    /// reaches a sink.
    pub fn new(image: Frame, code: impl Into<String>) -> Result<Self, CaptureError> {
        let code = code.into();
        if code.is_empty() {
            return Err(CaptureError::IncompleteSubmission);
        }
        Ok(Self { image, code })
    }
}

/// Receives completed submissions.
#[async_trait]
pub trait AttendanceSink: Send + Sync {
    /// Deliver one submission, returning the collaborator's receipt message.
    async fn submit(&self, submission: AttendanceSubmission) -> Result<String, CaptureError>;
}

/// Where the capture flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    CameraActive,
    Captured,
}

enum State {
    Idle,
    CameraActive { stream: Box<dyn CameraStream> },
    Captured { frame: Frame },
}

/// Drives the capture flow from camera start to attendance submission.
pub struct CaptureSession {
    state: State,
    camera: Arc<dyn Camera>,
    sink: Arc<dyn AttendanceSink>,
    notifier: Arc<dyn UserNotifier>,
}

impl CaptureSession {
    /// A new session starts idle with the camera off.
    pub fn new(
        camera: Arc<dyn Camera>,
        sink: Arc<dyn AttendanceSink>,
        notifier: Arc<dyn UserNotifier>,
    ) -> Self {
        Self {
            state: State::Idle,
            camera,
            sink,
            notifier,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        match self.state {
            State::Idle => CapturePhase::Idle,
            State::CameraActive { .. } => CapturePhase::CameraActive,
            State::Captured { .. } => CapturePhase::Captured,
        }
    }

    pub fn is_camera_on(&self) -> bool {
        matches!(self.state, State::CameraActive { .. })
    }

    /// The captured frame, while one is held.
    pub fn captured_frame(&self) -> Option<&Frame> {
        match &self.state {
            State::Captured { frame } => Some(frame),
            _ => None,
        }
    }

    /// Ask the device for a live stream.
    ///
    /// Only acts from idle. On refusal the user is alerted and the session
    /// stays idle, so the user can fix permissions and try again.
    #[tracing::instrument(skip_all)]
    pub async fn start_camera(&mut self) -> Result<(), CaptureError> {
        if !matches!(self.state, State::Idle) {
            debug!(phase = ?self.phase(), "start_camera ignored outside idle");
            return Ok(());
        }

        match self.camera.open(StreamConstraints::default()).await {
            Ok(stream) => {
                debug!("camera stream active");
                self.state = State::CameraActive { stream };
                Ok(())
            }
            Err(err) => {
                let denied = match err {
                    denied @ CaptureError::CameraAccessDenied { .. } => denied,
                    other => CaptureError::CameraAccessDenied {
                        reason: other.to_string(),
                    },
                };
                warn!(error = %denied, "camera stream refused");
                self.notifier.alert(&denied.to_string());
                Err(denied)
            }
        }
    }

    /// Grab a still frame from the live stream, then close the stream.
    ///
    /// On success the session holds the frame and the camera is off. If the
    /// grab fails the stream stays live for another attempt.
    #[tracing::instrument(skip_all)]
    pub async fn capture_image(&mut self) -> Result<(), CaptureError> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::CameraActive { mut stream } => match stream.still_frame().await {
                Ok(frame) => {
                    drop(stream);
                    debug!(bytes = frame.data.len(), "frame captured, stream closed");
                    self.state = State::Captured { frame };
                    Ok(())
                }
                Err(err) => {
                    warn!(error = %err, "still frame grab failed");
                    self.state = State::CameraActive { stream };
                    Err(err)
                }
            },
            other => {
                self.state = other;
                Err(CaptureError::NoActiveStream)
            }
        }
    }

    /// Discard the captured frame and return to idle.
    ///
    /// The camera is not restarted; the user starts it again explicitly.
    /// Calling this without a captured frame does nothing.
    pub fn retake(&mut self) {
        if matches!(self.state, State::Captured { .. }) {
            debug!("captured frame discarded");
            self.state = State::Idle;
        }
    }

    /// Hand the captured frame and the attendance code to the sink.
    ///
    /// Requires a captured frame and a non-empty code; anything less is
    /// refused locally and the sink is never called. On sink failure the
    /// frame is kept so the user can resubmit; on success it is consumed
    /// and the session returns to idle.
    #[tracing::instrument(skip_all, fields(code = %code))]
    pub async fn submit(&mut self, code: &str) -> Result<String, CaptureError> {
        let frame = match self.captured_frame() {
            Some(frame) => frame.clone(),
            None => return self.refuse_incomplete(),
        };

        let submission = match AttendanceSubmission::new(frame, code) {
            Ok(submission) => submission,
            Err(_) => return self.refuse_incomplete(),
        };

        match self.sink.submit(submission).await {
            Ok(receipt) => {
                info!("attendance submitted");
                self.state = State::Idle;
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "attendance submission failed");
                Err(err)
            }
        }
    }

    fn refuse_incomplete(&self) -> Result<String, CaptureError> {
        let err = CaptureError::IncompleteSubmission;
        self.notifier.alert(&err.to_string());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeCamera {
        grant: AtomicBool,
        opens: AtomicUsize,
        live_streams: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        fn new(grant: bool) -> Self {
            Self {
                grant: AtomicBool::new(grant),
                opens: AtomicUsize::new(0),
                live_streams: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Camera for FakeCamera {
        async fn open(
            &self,
            constraints: StreamConstraints,
        ) -> Result<Box<dyn CameraStream>, CaptureError> {
            assert!(constraints.video);
            assert!(!constraints.audio);
            self.opens.fetch_add(1, Ordering::SeqCst);
            if !self.grant.load(Ordering::SeqCst) {
                return Err(CaptureError::CameraAccessDenied {
                    reason: "permission denied".to_string(),
                });
            }
            self.live_streams.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                live_streams: Arc::clone(&self.live_streams),
            }))
        }
    }

    struct FakeStream {
        live_streams: Arc<AtomicUsize>,
    }

    impl Drop for FakeStream {
        fn drop(&mut self) {
            self.live_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CameraStream for FakeStream {
        async fn still_frame(&mut self) -> Result<Frame, CaptureError> {
            Ok(Frame::jpeg(b"face".to_vec()))
        }
    }

    #[derive(Default)]
    struct FakeSink {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl AttendanceSink for FakeSink {
        async fn submit(&self, submission: AttendanceSubmission) -> Result<String, CaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!submission.code.is_empty());
            if self.fail.load(Ordering::SeqCst) {
                return Err(CaptureError::SubmissionFailed {
                    reason: "service answered 500".to_string(),
                });
            }
            Ok("marked".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl UserNotifier for RecordingNotifier {
        fn alert(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    struct Harness {
        camera: Arc<FakeCamera>,
        sink: Arc<FakeSink>,
        notifier: Arc<RecordingNotifier>,
        session: CaptureSession,
    }

    fn harness(grant: bool) -> Harness {
        let camera = Arc::new(FakeCamera::new(grant));
        let sink = Arc::new(FakeSink::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let session = CaptureSession::new(
            Arc::clone(&camera) as Arc<dyn Camera>,
            Arc::clone(&sink) as Arc<dyn AttendanceSink>,
            Arc::clone(&notifier) as Arc<dyn UserNotifier>,
        );
        Harness {
            camera,
            sink,
            notifier,
            session,
        }
    }

    #[tokio::test]
    async fn denied_camera_alerts_and_stays_idle() {
        let mut h = harness(false);

        let err = h.session.start_camera().await.unwrap_err();
        assert!(matches!(err, CaptureError::CameraAccessDenied { .. }));
        assert_eq!(h.session.phase(), CapturePhase::Idle);
        assert_eq!(
            h.notifier.messages(),
            vec!["Camera access denied. Please enable camera permissions.".to_string()]
        );

        // Permission fixed, the retry succeeds from the same session
        h.camera.grant.store(true, Ordering::SeqCst);
        h.session.start_camera().await.unwrap();
        assert!(h.session.is_camera_on());
    }

    #[tokio::test]
    async fn capture_closes_the_stream_and_holds_the_frame() {
        let mut h = harness(true);
        h.session.start_camera().await.unwrap();
        assert_eq!(h.camera.live_streams.load(Ordering::SeqCst), 1);

        h.session.capture_image().await.unwrap();

        assert_eq!(h.session.phase(), CapturePhase::Captured);
        assert!(!h.session.is_camera_on());
        assert_eq!(h.camera.live_streams.load(Ordering::SeqCst), 0);
        assert_eq!(h.session.captured_frame().unwrap().data, b"face");
    }

    #[tokio::test]
    async fn capture_without_a_stream_fails() {
        let mut h = harness(true);
        let err = h.session.capture_image().await.unwrap_err();
        assert!(matches!(err, CaptureError::NoActiveStream));
        assert_eq!(h.session.phase(), CapturePhase::Idle);
    }

    #[tokio::test]
    async fn start_camera_is_a_noop_outside_idle() {
        let mut h = harness(true);
        h.session.start_camera().await.unwrap();
        h.session.start_camera().await.unwrap();
        assert_eq!(h.camera.opens.load(Ordering::SeqCst), 1);

        h.session.capture_image().await.unwrap();
        h.session.start_camera().await.unwrap();
        assert_eq!(h.camera.opens.load(Ordering::SeqCst), 1);
        assert_eq!(h.session.phase(), CapturePhase::Captured);
    }

    #[tokio::test]
    async fn retake_discards_without_restarting_the_camera() {
        let mut h = harness(true);
        h.session.start_camera().await.unwrap();
        h.session.capture_image().await.unwrap();

        h.session.retake();
        assert_eq!(h.session.phase(), CapturePhase::Idle);
        assert!(h.session.captured_frame().is_none());
        assert_eq!(h.camera.opens.load(Ordering::SeqCst), 1);

        // A second retake is a no-op
        h.session.retake();
        assert_eq!(h.session.phase(), CapturePhase::Idle);
    }

    #[tokio::test]
    async fn submit_without_a_frame_never_reaches_the_sink() {
        let mut h = harness(true);

        let err = h.session.submit("1234").await.unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteSubmission));
        assert_eq!(h.sink.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.notifier.messages(),
            vec!["Please capture your face and enter the attendance code.".to_string()]
        );
    }

    #[tokio::test]
    async fn submit_with_an_empty_code_never_reaches_the_sink() {
        let mut h = harness(true);
        h.session.start_camera().await.unwrap();
        h.session.capture_image().await.unwrap();

        let err = h.session.submit("").await.unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteSubmission));
        assert_eq!(h.sink.calls.load(Ordering::SeqCst), 0);
        // The frame is untouched for a later attempt
        assert_eq!(h.session.phase(), CapturePhase::Captured);
    }

    #[tokio::test]
    async fn successful_submit_consumes_the_frame() {
        let mut h = harness(true);
        h.session.start_camera().await.unwrap();
        h.session.capture_image().await.unwrap();

        let receipt = h.session.submit("1234").await.unwrap();
        assert_eq!(receipt, "marked");
        assert_eq!(h.sink.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.session.phase(), CapturePhase::Idle);
    }

    #[tokio::test]
    async fn failed_submit_keeps_the_frame_for_resubmission() {
        let mut h = harness(true);
        h.session.start_camera().await.unwrap();
        h.session.capture_image().await.unwrap();

        h.sink.fail.store(true, Ordering::SeqCst);
        let err = h.session.submit("1234").await.unwrap_err();
        assert!(matches!(err, CaptureError::SubmissionFailed { .. }));
        assert_eq!(h.session.phase(), CapturePhase::Captured);

        h.sink.fail.store(false, Ordering::SeqCst);
        let receipt = h.session.submit("1234").await.unwrap();
        assert_eq!(receipt, "marked");
        assert_eq!(h.sink.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn submission_requires_a_code() {
        let err = AttendanceSubmission::new(Frame::jpeg(b"face".to_vec()), "").unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteSubmission));

        let ok = AttendanceSubmission::new(Frame::jpeg(b"face".to_vec()), "1234").unwrap();
        assert_eq!(ok.code, "1234");
    }
}

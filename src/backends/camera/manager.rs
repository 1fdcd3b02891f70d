// SPDX-License-Identifier: GPL-3.0-only

//! Device acquisition: stream lifecycle on top of a camera backend
//!
//! The acquisition layer provides:
//! - Bounded opening (the backend call runs on the blocking pool under a timeout)
//! - Exclusive ownership of at most one live stream
//! - Close-before-open on reconfiguration
//! - Settling of an open that outlived its timeout before the next one starts
//! - Observable [`DeviceStatus`]

use super::types::*;
use super::{CameraBackend, CameraStream};
use crate::errors::DeviceError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Reaper that stops whatever a timed-out open eventually grants
type PendingOpen = JoinHandle<()>;

/// Owner of the camera stream
pub struct DeviceAcquisition {
    backend: Arc<dyn CameraBackend>,
    stream: Option<Box<dyn CameraStream>>,
    status: DeviceStatus,
    /// Constraints of the most recent open request, reused by `retry`
    constraints: Option<StreamConstraints>,
    /// Open that timed out but whose backend call has not returned yet
    pending: Option<PendingOpen>,
    open_timeout: Duration,
}

impl DeviceAcquisition {
    /// Create an acquisition layer over `backend`
    ///
    /// # Arguments
    /// * `backend` - Backend that opens streams
    /// * `open_timeout` - Upper bound on a single open request
    pub fn new(backend: Arc<dyn CameraBackend>, open_timeout: Duration) -> Self {
        info!(backend = %backend.backend_type(), "Creating device acquisition");
        Self {
            backend,
            stream: None,
            status: DeviceStatus::NotReady,
            constraints: None,
            pending: None,
            open_timeout,
        }
    }

    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_ready() && self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn backend_type(&self) -> CameraBackendType {
        self.backend.backend_type()
    }

    /// Constraints of the last open request
    pub fn constraints(&self) -> Option<StreamConstraints> {
        self.constraints
    }

    /// Borrow the live stream for a capture
    pub fn stream_mut(&mut self) -> Option<&mut (dyn CameraStream + 'static)> {
        if !self.status.is_ready() {
            return None;
        }
        self.stream.as_deref_mut()
    }

    /// Open a stream for `constraints`
    ///
    /// Any held stream is released first, so two streams never overlap. A
    /// timed-out open keeps running on the blocking pool; a reaper stops its
    /// stream if one is granted late. The next open waits (for up to the
    /// open timeout) for that reaper before asking the backend again, and
    /// fails with [`DeviceError::Busy`] if the earlier open is still
    /// unanswered. On failure the status becomes `Failed` and stays there
    /// until the next open or retry.
    pub async fn open(&mut self, constraints: StreamConstraints) -> BackendResult<()> {
        self.release();
        self.constraints = Some(constraints);
        self.status = DeviceStatus::Opening;

        let result = match self.settle_pending().await {
            Ok(()) => self.request(constraints).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                info!(device = %stream.device(), width, height, "Camera stream ready");
                self.stream = Some(stream);
                self.status = DeviceStatus::Ready;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Failed to open camera stream");
                self.status = DeviceStatus::Failed(err.clone());
                Err(err)
            }
        }
    }

    async fn request(
        &mut self,
        constraints: StreamConstraints,
    ) -> BackendResult<Box<dyn CameraStream>> {
        info!(%constraints, "Opening camera stream");

        let backend = Arc::clone(&self.backend);
        let mut handle = tokio::task::spawn_blocking(move || backend.open(&constraints));

        match tokio::time::timeout(self.open_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(DeviceError::Backend(format!(
                "open task failed: {join_err}"
            ))),
            Err(_) => {
                let millis = self.open_timeout.as_millis() as u64;
                warn!(millis, "Camera open timed out");
                self.pending = Some(tokio::spawn(async move {
                    if let Ok(Ok(mut late)) = handle.await {
                        warn!(device = %late.device(), "Releasing stream granted after timeout");
                        late.stop();
                    }
                }));
                Err(DeviceError::Timeout(millis))
            }
        }
    }

    /// Wait until an open that outlived its timeout has been answered and
    /// its stream, if any, stopped
    async fn settle_pending(&mut self) -> BackendResult<()> {
        let Some(handle) = self.pending.as_mut() else {
            return Ok(());
        };
        debug!("Waiting for an earlier camera open to answer");

        let waited = tokio::time::timeout(self.open_timeout, handle).await;
        match waited {
            Ok(_) => {
                self.pending = None;
                Ok(())
            }
            Err(_) => {
                warn!("Earlier camera open is still unanswered");
                Err(DeviceError::Busy)
            }
        }
    }

    /// Whether a timed-out open has yet to be settled by a later open
    pub fn has_pending_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Reopen with new constraints
    ///
    /// No-op when the stream is ready and already satisfies them.
    pub async fn reconfigure(&mut self, constraints: StreamConstraints) -> BackendResult<()> {
        if self.is_ready() && self.constraints == Some(constraints) {
            debug!(%constraints, "Stream already matches constraints");
            return Ok(());
        }
        info!(%constraints, "Reconfiguring camera stream");
        self.open(constraints).await
    }

    /// Reopen with the constraints of the last request
    pub async fn retry(&mut self) -> BackendResult<()> {
        let Some(constraints) = self.constraints else {
            return Err(DeviceError::NotFound(
                "no stream has been requested yet".to_string(),
            ));
        };
        info!(%constraints, "Retrying camera stream");
        self.open(constraints).await
    }

    /// Release the stream, if any
    pub fn close(&mut self) {
        self.release();
        self.abandon_pending();
        self.status = DeviceStatus::NotReady;
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            info!(device = %stream.device(), "Releasing camera stream");
            stream.stop();
        }
    }

    /// Stop tracking an unanswered open; its reaper still stops the stream
    fn abandon_pending(&mut self) {
        if self.pending.take().is_some() {
            debug!("Abandoning unanswered camera open");
        }
    }
}

impl Drop for DeviceAcquisition {
    fn drop(&mut self) {
        self.release();
        self.abandon_pending();
    }
}

impl std::fmt::Debug for DeviceAcquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAcquisition")
            .field("backend_type", &self.backend.backend_type())
            .field("status", &self.status)
            .field("constraints", &self.constraints)
            .field("pending_open", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::VirtualCameraBackend;
    use crate::config::Facing;

    fn constraints(facing: Facing) -> StreamConstraints {
        StreamConstraints {
            width: 64,
            height: 48,
            facing,
        }
    }

    #[tokio::test]
    async fn open_then_close_releases_stream() {
        let backend = Arc::new(VirtualCameraBackend::default());
        let stats = backend.stats();
        let mut acquisition = DeviceAcquisition::new(backend, Duration::from_secs(1));

        acquisition.open(constraints(Facing::User)).await.unwrap();
        assert!(acquisition.is_ready());
        assert_eq!(stats.open_streams(), 1);

        acquisition.close();
        assert_eq!(acquisition.status(), &DeviceStatus::NotReady);
        assert_eq!(stats.open_streams(), 0);
        assert!(acquisition.stream_mut().is_none());
    }

    #[tokio::test]
    async fn denied_open_is_reported_as_status() {
        let backend = Arc::new(
            VirtualCameraBackend::default().with_open_error(DeviceError::PermissionDenied),
        );
        let mut acquisition = DeviceAcquisition::new(backend, Duration::from_secs(1));

        let err = acquisition.open(constraints(Facing::User)).await.unwrap_err();
        assert_eq!(err, DeviceError::PermissionDenied);
        assert_eq!(
            acquisition.status(),
            &DeviceStatus::Failed(DeviceError::PermissionDenied)
        );
        assert!(!acquisition.is_ready());
    }

    #[tokio::test]
    async fn reconfigure_with_same_constraints_keeps_stream() {
        let backend = Arc::new(VirtualCameraBackend::default());
        let stats = backend.stats();
        let mut acquisition = DeviceAcquisition::new(backend, Duration::from_secs(1));

        acquisition.open(constraints(Facing::User)).await.unwrap();
        acquisition.reconfigure(constraints(Facing::User)).await.unwrap();
        assert_eq!(stats.total_opened(), 1);

        acquisition.reconfigure(constraints(Facing::Environment)).await.unwrap();
        assert_eq!(stats.total_opened(), 2);
        assert_eq!(stats.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn late_grant_is_stopped_before_the_next_open() {
        let backend = Arc::new(
            VirtualCameraBackend::default().with_slow_opens(1, Duration::from_millis(300)),
        );
        let stats = backend.stats();
        let mut acquisition = DeviceAcquisition::new(backend, Duration::from_millis(100));

        let err = acquisition.open(constraints(Facing::User)).await.unwrap_err();
        assert_eq!(err, DeviceError::Timeout(100));
        assert!(acquisition.has_pending_open());

        // Still unanswered after another timeout window
        assert_eq!(acquisition.retry().await, Err(DeviceError::Busy));
        assert_eq!(stats.total_opened(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        acquisition.retry().await.unwrap();
        assert!(!acquisition.has_pending_open());
        assert!(acquisition.is_ready());
        assert_eq!(stats.total_opened(), 2);
        assert_eq!(stats.open_streams(), 1);
        assert_eq!(stats.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn retry_after_lifted_refusal_is_ready() {
        let backend = VirtualCameraBackend::default().with_open_error(DeviceError::PermissionDenied);
        let control = backend.clone();
        let mut acquisition = DeviceAcquisition::new(Arc::new(backend), Duration::from_secs(1));

        assert!(acquisition.open(constraints(Facing::User)).await.is_err());
        control.set_open_error(None);
        acquisition.retry().await.unwrap();
        assert_eq!(acquisition.status(), &DeviceStatus::Ready);
        assert!(acquisition.stream_mut().is_some());
    }

    #[tokio::test]
    async fn retry_without_request_fails() {
        let backend = Arc::new(VirtualCameraBackend::default());
        let mut acquisition = DeviceAcquisition::new(backend, Duration::from_secs(1));
        assert!(matches!(
            acquisition.retry().await,
            Err(DeviceError::NotFound(_))
        ));
    }
}

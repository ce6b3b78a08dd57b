use std::sync::Arc;
use std::thread::JoinHandle;

use strafe_motion::{DriveSample, TelemetrySink};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

// Sending only fails with no live receiver, which a sink ignores.
impl TelemetrySink for Topic<DriveSample> {
    fn publish(&self, sample: DriveSample) {
        let _ = self.tx.send(Arc::new(sample));
    }
}

/// Drain drive samples into the log until every sender is gone.
pub fn spawn_logger(mut rx: broadcast::Receiver<Arc<DriveSample>>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new().name("telemetry".into()).spawn(move || {
        info!("Telemetry logger started.");
        loop {
            match rx.blocking_recv() {
                Ok(sample) => match &*sample {
                    DriveSample::EstimatedPose(pose) => debug!(%pose, "estimated pose"),
                    DriveSample::TargetPose(pose) => debug!(%pose, "target pose"),
                    DriveSample::DriveCommand(command) => debug!(command = %command.value(), "drive command"),
                    DriveSample::MecanumCommand { voltage, powers } => {
                        debug!(voltage, %powers, "mecanum command")
                    }
                    DriveSample::TrackingError { x, y, heading_deg } => {
                        debug!(x, y, heading_deg, "tracking error")
                    }
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "telemetry logger fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
        info!("Telemetry logger stopped.");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strafe_kinematics::Pose2;

    #[test]
    fn test_publish_without_receiver_is_silent() {
        let topic: Topic<DriveSample> = Topic::new(4);
        topic.publish(DriveSample::EstimatedPose(Pose2::identity()));
    }

    #[test]
    fn test_subscriber_sees_samples_in_order() {
        let topic: Topic<DriveSample> = Topic::new(4);
        let mut rx = topic.subscribe();
        topic.publish(DriveSample::EstimatedPose(Pose2::new(1.0, 0.0, 0.0)));
        topic.publish(DriveSample::TargetPose(Pose2::new(2.0, 0.0, 0.0)));
        assert!(matches!(*rx.try_recv().unwrap(), DriveSample::EstimatedPose(_)));
        assert!(matches!(*rx.try_recv().unwrap(), DriveSample::TargetPose(_)));
    }

    #[test]
    fn test_slow_receiver_lags_instead_of_blocking() {
        let topic: Topic<DriveSample> = Topic::new(2);
        let mut rx = topic.subscribe();
        for i in 0..5 {
            topic.publish(DriveSample::EstimatedPose(Pose2::new(i as f64, 0.0, 0.0)));
        }
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Lagged(3))));
    }
}

pub mod default_failure_detector_registry;
pub mod failure_detector_registry;
pub mod phi_accrual_failure_detector;

/// A failure detector for a single monitored resource.
///
/// Implementations are internally synchronized, so a detector can be shared between the task
/// receiving heartbeats and the tasks querying availability.
pub trait FailureDetector: Send + Sync {
    /// Returns `true` if the resource is considered to be up and healthy.
    fn is_available(&self) -> bool;

    /// Returns `true` if the detector has received any heartbeats and started monitoring
    /// the resource.
    fn is_monitoring(&self) -> bool;

    /// Notifies the detector that a heartbeat arrived from the monitored resource.
    fn heartbeat(&self);

    /// Current suspicion level. `0.0` means no suspicion at all.
    fn phi(&self) -> f64;
}

use std::fmt::Debug;
use std::hash::Hash;

/// Keeps one failure detector per monitored resource. A resource is registered implicitly by
/// its first heartbeat.
pub trait FailureDetectorRegistry: Debug + Send {
    type A: Hash + Eq;

    /// Unknown resources are considered available.
    fn is_available(&self, resource: &Self::A) -> bool;

    fn is_monitoring(&self, resource: &Self::A) -> bool;

    /// Unknown resources have a phi of `0.0`.
    fn phi(&self, resource: &Self::A) -> f64;

    fn heartbeat(&mut self, resource: Self::A);

    fn remove(&mut self, resource: &Self::A);

    fn reset(&mut self);
}

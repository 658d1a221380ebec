use std::any::type_name;
use std::collections::hash_map::Entry;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;

use ahash::HashMap;
use tracing::debug;

use crate::failure_detector::failure_detector_registry::FailureDetectorRegistry;
use crate::failure_detector::FailureDetector;

pub struct DefaultFailureDetectorRegistry<A> {
    detector_factory: Box<dyn Fn() -> Box<dyn FailureDetector> + Send>,
    resource_to_failure_detector: HashMap<A, Box<dyn FailureDetector>>,
}

impl<A> DefaultFailureDetectorRegistry<A> {
    pub fn new<F>(factory: F) -> DefaultFailureDetectorRegistry<A>
        where
            F: Fn() -> Box<dyn FailureDetector> + Send + 'static,
    {
        let detector_factory = Box::new(factory);
        Self {
            detector_factory,
            resource_to_failure_detector: Default::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.resource_to_failure_detector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_to_failure_detector.is_empty()
    }
}

impl<A> Debug for DefaultFailureDetectorRegistry<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let struct_name = format!("DefaultFailureDetectorRegistry<{}>", type_name::<A>());
        f.debug_struct(&struct_name)
            .field("resources", &self.resource_to_failure_detector.len())
            .finish_non_exhaustive()
    }
}

impl<A> FailureDetectorRegistry for DefaultFailureDetectorRegistry<A> where A: Send + Hash + Eq + Debug {
    type A = A;

    fn is_available(&self, resource: &Self::A) -> bool {
        match self.resource_to_failure_detector.get(resource) {
            None => true,
            Some(r) => r.is_available(),
        }
    }

    fn is_monitoring(&self, resource: &Self::A) -> bool {
        match self.resource_to_failure_detector.get(resource) {
            None => false,
            Some(r) => r.is_monitoring(),
        }
    }

    fn phi(&self, resource: &Self::A) -> f64 {
        match self.resource_to_failure_detector.get(resource) {
            None => 0.0,
            Some(r) => r.phi(),
        }
    }

    fn heartbeat(&mut self, resource: Self::A) {
        match self.resource_to_failure_detector.entry(resource) {
            Entry::Occupied(o) => {
                o.get().heartbeat();
            }
            Entry::Vacant(v) => {
                debug!("start monitoring {:?}", v.key());
                let r = (self.detector_factory)();
                r.heartbeat();
                v.insert(r);
            }
        }
    }

    fn remove(&mut self, resource: &Self::A) {
        if self.resource_to_failure_detector.remove(resource).is_some() {
            debug!("stop monitoring {:?}", resource);
        }
    }

    fn reset(&mut self) {
        self.resource_to_failure_detector.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::clock::ManualClock;
    use crate::failure_detector::default_failure_detector_registry::DefaultFailureDetectorRegistry;
    use crate::failure_detector::failure_detector_registry::FailureDetectorRegistry;
    use crate::failure_detector::phi_accrual_failure_detector::PhiAccrualFailureDetector;
    use crate::failure_detector::FailureDetector;
    use crate::settings::PhiAccrualSettings;

    fn registry(clock: &ManualClock) -> DefaultFailureDetectorRegistry<String> {
        let clock = clock.clone();
        DefaultFailureDetectorRegistry::new(move || {
            let settings = PhiAccrualSettings::builder()
                .threshold(8.0)
                .max_sample_size(1000)
                .min_std_deviation(Duration::from_millis(10))
                .acceptable_heartbeat_pause(Duration::ZERO)
                .first_heartbeat_estimate(Duration::from_secs(1))
                .build();
            let detector = PhiAccrualFailureDetector::with_clock(settings, Arc::new(clock.clone()))
                .expect("valid settings");
            Box::new(detector) as Box<dyn FailureDetector>
        })
    }

    #[test]
    fn unknown_resource_is_available_and_not_monitored() {
        let clock = ManualClock::new(0.0);
        let registry = registry(&clock);
        let node = "node-a:4100".to_string();
        assert!(registry.is_available(&node));
        assert!(!registry.is_monitoring(&node));
        assert_eq!(registry.phi(&node), 0.0);
    }

    #[test]
    fn first_heartbeat_registers_resource() {
        let clock = ManualClock::new(0.0);
        let mut registry = registry(&clock);
        let node = "node-a:4100".to_string();
        registry.heartbeat(node.clone());
        assert!(registry.is_monitoring(&node));
        assert!(registry.is_available(&node));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn detects_unavailable_resource() {
        let clock = ManualClock::new(0.0);
        let mut registry = registry(&clock);
        let a = "node-a:4100".to_string();
        let b = "node-b:4100".to_string();
        for _ in 0..5 {
            registry.heartbeat(a.clone());
            registry.heartbeat(b.clone());
            clock.advance(Duration::from_millis(1000));
        }
        assert!(registry.is_available(&a));
        clock.advance(Duration::from_secs(4));
        registry.heartbeat(b.clone());
        assert!(!registry.is_available(&a));
        assert!(registry.is_available(&b));
    }

    #[test]
    fn remove_and_reset_forget_resources() {
        let clock = ManualClock::new(0.0);
        let mut registry = registry(&clock);
        let a = "node-a:4100".to_string();
        let b = "node-b:4100".to_string();
        registry.heartbeat(a.clone());
        registry.heartbeat(b.clone());
        registry.remove(&a);
        assert!(!registry.is_monitoring(&a));
        assert!(registry.is_monitoring(&b));
        registry.reset();
        assert!(registry.is_empty());
        assert!(!registry.is_monitoring(&b));
    }
}

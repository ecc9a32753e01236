use std::collections::VecDeque;
use std::thread::JoinHandle;

/// A value produced by background fetches, observed by polling once per UI
/// pass. Issuing a fetch never blocks the frame; its result lands on a later
/// poll, as an independent event.
///
/// Results are applied unconditionally in arrival order. There is no
/// cancellation: two rapid requests can resolve out of issue order, letting
/// the older response overwrite the newer one's value. That race exists in
/// the system this models and is deliberately left in place.
pub struct FetchSlot<T> {
    value: Option<T>,
    generation: usize,
    in_flight: VecDeque<JoinHandle<T>>,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            value: None,
            generation: 0,
            in_flight: VecDeque::new(),
        }
    }
}

impl<T> std::fmt::Debug for FetchSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.value, self.in_flight.len()) {
            (None, 0) => write!(f, "Undefined"),
            (None, n) => write!(f, "Init({n})"),
            (Some(_), 0) => write!(f, "Ready#{}", self.generation),
            (Some(_), n) => write!(f, "Stale#{}({n})", self.generation),
        }
    }
}

impl<T: Send + 'static> FetchSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch on a worker thread. The previous value stays visible
    /// until a result arrives.
    pub fn spawn(&mut self, job: impl FnOnce() -> T + Send + 'static) {
        self.in_flight.push_back(std::thread::spawn(job));
    }

    /// Apply every finished fetch, in arrival order. Returns true when the
    /// value changed this poll.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        let mut still_running = VecDeque::with_capacity(self.in_flight.len());
        for handle in self.in_flight.drain(..) {
            if handle.is_finished() {
                self.value = Some(handle.join().unwrap());
                self.generation += 1;
                applied = true;
            } else {
                still_running.push_back(handle);
            }
        }
        self.in_flight = still_running;
        applied
    }

    pub fn is_running(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Bumped each time a result is applied; dependents compare generations
    /// to notice fresh data.
    pub fn generation(&self) -> usize {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settle<T: Send + 'static>(slot: &mut FetchSlot<T>) {
        while slot.is_running() {
            slot.poll();
            std::thread::sleep(Duration::from_millis(1));
        }
        slot.poll();
    }

    #[test]
    fn value_arrives_on_a_later_poll() {
        let mut slot = FetchSlot::new();
        slot.spawn(|| 42);
        settle(&mut slot);
        assert_eq!(slot.value(), Some(&42));
        assert_eq!(slot.generation(), 1);
    }

    #[test]
    fn every_response_is_applied_even_when_stale() {
        // A slow first fetch resolving after a fast second one still lands:
        // arrival order wins, not issue order.
        let mut slot = FetchSlot::new();
        slot.spawn(|| {
            std::thread::sleep(Duration::from_millis(30));
            "older"
        });
        slot.spawn(|| "newer");
        settle(&mut slot);
        assert_eq!(slot.value(), Some(&"older"));
        assert_eq!(slot.generation(), 2);
    }

    #[test]
    fn previous_value_stays_visible_while_refetching() {
        let mut slot = FetchSlot::new();
        slot.spawn(|| 1);
        settle(&mut slot);
        slot.spawn(|| {
            std::thread::sleep(Duration::from_millis(50));
            2
        });
        assert!(slot.is_running());
        assert_eq!(slot.value(), Some(&1));
    }
}

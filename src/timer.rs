/// The grace period between a failed attempt and its cards flipping back.
///
/// Time only moves when the host calls [`FlipBackTimer::advance`] with the
/// frame delta, in seconds. At most one attempt is pending; scheduling a new
/// one replaces it and cancelling drops it, so a timer from an abandoned game
/// can never fire into a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct FlipBackTimer {
    delay: f64,
    pending: Option<Pending>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pending {
    attempt: u32,
    time_since_scheduled: f64,
}

impl FlipBackTimer {
    pub fn new(delay: f64) -> FlipBackTimer {
        FlipBackTimer { delay, pending: None }
    }

    /// The attempt waiting to flip back, if any.
    pub fn pending(&self) -> Option<u32> {
        self.pending.map(|pending| pending.attempt)
    }

    pub fn schedule(&mut self, attempt: u32) {
        self.pending = Some(Pending {
            attempt,
            time_since_scheduled: 0.0,
        });
    }

    pub fn cancel(&mut self) -> Option<u32> {
        self.pending.take().map(|pending| pending.attempt)
    }

    /// Returns the attempt that came due during this step.
    pub fn advance(&mut self, dt: f64) -> Option<u32> {
        let pending = self.pending.as_mut()?;
        pending.time_since_scheduled += dt;
        if pending.time_since_scheduled >= self.delay {
            self.cancel()
        } else {
            None
        }
    }

    /// Fires `attempt` right away. Anything but the pending attempt is stale.
    pub fn fire(&mut self, attempt: u32) -> bool {
        if self.pending() == Some(attempt) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

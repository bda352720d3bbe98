//! Subscription handles (explicit disposal).

type Teardown = Box<dyn FnOnce() + Send>;

/// Handle to a live subscription.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) detaches the
/// observer from every upstream source it was attached to. Keep the handle alive
/// for as long as values should keep flowing.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    teardowns: Vec<Teardown>,
}

impl Subscription {
    /// A subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self {
            teardowns: Vec::new(),
        }
    }

    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardowns: vec![Box::new(teardown)],
        }
    }

    /// Take ownership of `other`; both are torn down together.
    pub fn add(&mut self, mut other: Subscription) {
        self.teardowns.append(&mut other.teardowns);
    }

    pub fn add_teardown(&mut self, teardown: impl FnOnce() + Send + 'static) {
        self.teardowns.push(Box::new(teardown));
    }

    pub fn is_empty(&self) -> bool {
        self.teardowns.is_empty()
    }

    pub fn unsubscribe(mut self) {
        self.run_teardowns();
    }

    // Last added runs first.
    fn run_teardowns(&mut self) {
        while let Some(teardown) = self.teardowns.pop() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardowns();
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("teardowns", &self.teardowns.len())
            .finish()
    }
}

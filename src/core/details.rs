//! Read/write view of a running machine handed to guards, actions and listeners.

use super::context::Context;
use super::state::StateId;

/// Snapshot of a machine's runtime situation plus access to its context.
///
/// Guards and listeners receive `&MachineDetails` and can only read the
/// context. Actions receive `&mut MachineDetails` and may also write to it.
pub struct MachineDetails<'a, S: StateId> {
    current: &'a S,
    running: bool,
    context: &'a mut Context,
}

impl<'a, S: StateId> MachineDetails<'a, S> {
    pub(crate) fn new(current: &'a S, running: bool, context: &'a mut Context) -> Self {
        Self {
            current,
            running,
            context,
        }
    }

    /// The state the machine is in while the callback runs.
    ///
    /// During transition actions this is still the source state; during entry
    /// actions it is already the target.
    pub fn current_state(&self) -> &S {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn context(&self) -> &Context {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_expose_state_and_context() {
        let state = "S1";
        let mut context = Context::new();
        context.set_value("seen", false);

        let mut details = MachineDetails::new(&state, true, &mut context);
        assert_eq!(details.current_state(), &"S1");
        assert!(details.is_running());

        details.context_mut().set_value("seen", true);
        assert_eq!(details.context().get::<bool>("seen"), Some(&true));
    }
}

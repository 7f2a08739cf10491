use crate::core::lifecycle::{LifecycleState, LifecycleStateMachine, Transition};
use crate::error::CambufferResult;
use crate::params::ParameterSet;
use std::fmt;

/// Outcome of a lifecycle callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackReturn {
    /// Move on to the transition's target state
    Success,
    /// Stay in the state the transition started from
    Failure,
    /// Enter `error_processing`
    Error,
}

impl fmt::Display for CallbackReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackReturn::Success => write!(f, "success"),
            CallbackReturn::Failure => write!(f, "failure"),
            CallbackReturn::Error => write!(f, "error"),
        }
    }
}

/// Callbacks of a lifecycle-managed node
///
/// Only `on_configure` sees the launch parameters. Every callback defaults to
/// `Success`.
pub trait LifecycleNode: Send {
    /// Default instance name, used when the launch does not rename the node
    fn name(&self) -> &str;

    fn on_configure(&mut self, _params: &ParameterSet) -> CallbackReturn {
        CallbackReturn::Success
    }

    fn on_activate(&mut self) -> CallbackReturn {
        CallbackReturn::Success
    }

    fn on_deactivate(&mut self) -> CallbackReturn {
        CallbackReturn::Success
    }

    fn on_cleanup(&mut self) -> CallbackReturn {
        CallbackReturn::Success
    }

    fn on_shutdown(&mut self, _from: LifecycleState) -> CallbackReturn {
        CallbackReturn::Success
    }

    /// Called after the node entered `error_processing`
    fn on_error(&mut self, error: &str) {
        log::error!("[{}] node error: {}", self.name(), error);
    }
}

/// A lifecycle node paired with the state machine that guards it
pub struct ManagedNode<N: LifecycleNode> {
    node: N,
    machine: LifecycleStateMachine,
    params: ParameterSet,
}

impl<N: LifecycleNode> ManagedNode<N> {
    /// `params` is what the launch supplied; it is only read on configure
    pub fn new(instance_name: impl Into<String>, node: N, params: ParameterSet) -> Self {
        Self {
            node,
            machine: LifecycleStateMachine::new(instance_name),
            params,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.machine.state()
    }

    pub fn machine(&self) -> &LifecycleStateMachine {
        &self.machine
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Run `transition` through the node's callback.
    ///
    /// Illegal transitions are rejected before any callback runs. The returned
    /// state is where the node ended up.
    pub fn trigger(&mut self, transition: Transition) -> CambufferResult<LifecycleState> {
        let from = self.machine.state();
        self.machine.check(transition)?;

        let outcome = match transition {
            Transition::Configure => self.node.on_configure(&self.params),
            Transition::Activate => self.node.on_activate(),
            Transition::Deactivate => self.node.on_deactivate(),
            Transition::Cleanup => self.node.on_cleanup(),
            Transition::Shutdown => self.node.on_shutdown(from),
        };

        match outcome {
            CallbackReturn::Success => self.machine.apply(transition),
            // shutdown always finalizes, whatever the callback reports
            _ if transition == Transition::Shutdown => {
                log::warn!(
                    "[{}] on_shutdown returned {}, finalizing anyway",
                    self.machine.node_name(),
                    outcome
                );
                self.machine.apply(transition)
            }
            CallbackReturn::Failure => {
                log::warn!(
                    "[{}] {} failed, staying {}",
                    self.machine.node_name(),
                    transition,
                    from
                );
                Ok(from)
            }
            CallbackReturn::Error => {
                let reason = format!("{} callback returned error", transition);
                self.machine.fault(reason.clone());
                self.node.on_error(&reason);
                Ok(self.machine.state())
            }
        }
    }

    /// Report an internal fault from outside a callback
    pub fn fault(&mut self, reason: &str) {
        if self.machine.fault(reason) {
            self.node.on_error(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ScriptedNode {
        configure: Option<CallbackReturn>,
        activate: Option<CallbackReturn>,
        seen_fps: Option<i64>,
        errors: Vec<String>,
    }

    impl LifecycleNode for ScriptedNode {
        fn name(&self) -> &str {
            "scripted"
        }

        fn on_configure(&mut self, params: &ParameterSet) -> CallbackReturn {
            self.seen_fps = params.get_int("fps");
            self.configure.unwrap_or(CallbackReturn::Success)
        }

        fn on_activate(&mut self) -> CallbackReturn {
            self.activate.unwrap_or(CallbackReturn::Success)
        }

        fn on_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }
    }

    #[test]
    fn test_configure_receives_launch_parameters() {
        let params = ParameterSet::new().with("fps", 30);
        let mut managed = ManagedNode::new("n", ScriptedNode::default(), params);

        assert_eq!(managed.trigger(Transition::Configure).unwrap(), LifecycleState::Inactive);
        assert_eq!(managed.node().seen_fps, Some(30));
    }

    #[test]
    fn test_failure_keeps_source_state() {
        let node = ScriptedNode {
            configure: Some(CallbackReturn::Failure),
            ..Default::default()
        };
        let mut managed = ManagedNode::new("n", node, ParameterSet::new());

        assert_eq!(managed.trigger(Transition::Configure).unwrap(), LifecycleState::Unconfigured);
        assert_eq!(managed.state(), LifecycleState::Unconfigured);
    }

    #[test]
    fn test_error_enters_error_processing() {
        let node = ScriptedNode {
            activate: Some(CallbackReturn::Error),
            ..Default::default()
        };
        let mut managed = ManagedNode::new("n", node, ParameterSet::new());
        managed.trigger(Transition::Configure).unwrap();

        assert_eq!(managed.trigger(Transition::Activate).unwrap(), LifecycleState::ErrorProcessing);
        assert_eq!(managed.node().errors, ["activate callback returned error"]);
        assert!(managed.trigger(Transition::Cleanup).is_err());
        assert_eq!(managed.trigger(Transition::Shutdown).unwrap(), LifecycleState::Finalized);
    }

    #[test]
    fn test_illegal_transition_skips_callback() {
        let mut managed = ManagedNode::new("n", ScriptedNode::default(), ParameterSet::new().with("fps", 5));
        assert!(managed.trigger(Transition::Activate).is_err());
        assert_eq!(managed.node().seen_fps, None);
    }

    #[test]
    fn test_external_fault() {
        let mut managed = ManagedNode::new("n", ScriptedNode::default(), ParameterSet::new());
        managed.fault("camera unplugged");
        assert_eq!(managed.state(), LifecycleState::ErrorProcessing);
        assert_eq!(managed.node().errors, ["camera unplugged"]);
    }
}

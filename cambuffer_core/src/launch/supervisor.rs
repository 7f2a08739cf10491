use crate::error::CambufferResult;
use crate::launch::descriptor::LaunchDescriptor;

/// Whatever turns a descriptor into running processes.
///
/// The descriptor is moved in: once handed over, the caller keeps nothing.
/// Name resolution, process spawning and lifecycle transitions all happen
/// on the supervisor's side.
pub trait Supervisor {
    fn launch(&mut self, descriptor: LaunchDescriptor) -> CambufferResult<()>;
}

impl<S: Supervisor + ?Sized> Supervisor for Box<S> {
    fn launch(&mut self, descriptor: LaunchDescriptor) -> CambufferResult<()> {
        (**self).launch(descriptor)
    }
}

/// Build a descriptor and hand it straight to `supervisor`
pub fn launch_with<S, F>(supervisor: &mut S, build: F) -> CambufferResult<()>
where
    S: Supervisor + ?Sized,
    F: FnOnce() -> LaunchDescriptor,
{
    let descriptor = build();
    log::info!(
        "handing {} node(s) to supervisor: {}",
        descriptor.len(),
        descriptor.fully_qualified_names().join(", ")
    );
    supervisor.launch(descriptor)
}

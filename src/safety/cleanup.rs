/// Sandbox teardown guard
/// A sandbox is removed exactly once, on every exit path of the run that
/// created it: success, engine errors during attach/start, or a dropped
/// connection while streaming.
use crate::config::types::Result;
use crate::core::backend::SandboxBackend;
use crate::observability::audit::{self, CorrelationIds};

/// Owns a created sandbox until it is removed
pub struct ContainerGuard<'a, B: SandboxBackend + ?Sized> {
    backend: &'a B,
    id: String,
    correlation: CorrelationIds,
    released: bool,
}

impl<'a, B: SandboxBackend + ?Sized> ContainerGuard<'a, B> {
    /// Take ownership of sandbox `id`, which must already exist
    pub fn new(backend: &'a B, id: String, correlation: CorrelationIds) -> Self {
        Self {
            backend,
            id,
            correlation,
            released: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn correlation(&self) -> &CorrelationIds {
        &self.correlation
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Remove the sandbox now (idempotent).
    ///
    /// A failed removal is not retried; the sandbox is reported and left to
    /// the operator.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        match self.backend.remove(&self.id) {
            Ok(()) => {
                audit::sandbox_removed(&self.correlation);
                Ok(())
            }
            Err(e) => {
                audit::removal_failed(&self.correlation, e.to_string());
                Err(e)
            }
        }
    }
}

impl<B: SandboxBackend + ?Sized> Drop for ContainerGuard<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Failed to remove sandbox {}: {}", self.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    #[test]
    fn test_drop_removes_sandbox() {
        let backend = ScriptedBackend::succeeding("{}");
        {
            let _guard = ContainerGuard::new(&backend, "c1".to_string(), CorrelationIds::new());
        }
        assert_eq!(backend.removed(), vec!["c1".to_string()]);
    }

    #[test]
    fn test_release_is_idempotent() {
        let backend = ScriptedBackend::succeeding("{}");
        let mut guard = ContainerGuard::new(&backend, "c2".to_string(), CorrelationIds::new());
        guard.release().unwrap();
        guard.release().unwrap();
        assert!(guard.is_released());
        drop(guard);
        assert_eq!(backend.removed(), vec!["c2".to_string()]);
    }

    #[test]
    fn test_failed_removal_reported_once() {
        let backend = ScriptedBackend::succeeding("{}").fail_remove();
        let mut guard = ContainerGuard::new(&backend, "c3".to_string(), CorrelationIds::new());
        assert!(guard.release().is_err());
        drop(guard);
        assert_eq!(backend.remove_attempts(), 1);
    }
}

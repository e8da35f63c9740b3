use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Soft archival flag. Archived records stay in storage and are hidden from
/// default listings; nothing in the kernel deletes a record through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct Archive(bool);

impl Archive {
    pub fn new(active: impl Into<bool>) -> Self {
        Self(active.into())
    }

    pub fn is_active(&self) -> bool {
        self.0
    }

    pub fn toggle(&mut self) {
        self.0 = !self.0;
    }

    pub fn archive(&mut self) {
        self.0 = false;
    }

    pub fn restore(&mut self) {
        self.0 = true;
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod test {
    use super::Archive;

    #[test]
    fn toggle_flips_active_flag() {
        let mut archive = Archive::default();
        assert!(archive.is_active());
        archive.toggle();
        assert!(!archive.is_active());
        archive.toggle();
        assert!(archive.is_active());
    }

    #[test]
    fn archive_and_restore_are_idempotent() {
        let mut archive = Archive::default();
        archive.archive();
        archive.archive();
        assert!(!archive.is_active());
        archive.restore();
        archive.restore();
        assert!(archive.is_active());
    }
}

use std::fmt;
use std::time::Instant;

use parking_lot::Mutex;

use crate::Element;
use crate::PositionTree;

/// A decoded configuration value, shared by every subscription that resolves
/// to the same checksum.
///
/// Only the last-touch timestamp ever changes after construction.
pub struct SpecificConfig {
    value: Element,
    positions: PositionTree,
    checksum: Vec<u8>,
    last_touch: Mutex<Instant>,
}

impl SpecificConfig {
    pub(crate) fn new(
        value: Element,
        checksum: Vec<u8>,
    ) -> Self {
        Self {
            value,
            positions: PositionTree::default(),
            checksum,
            last_touch: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn with_positions(
        mut self,
        positions: PositionTree,
    ) -> Self {
        self.positions = positions;
        self
    }

    pub fn value(&self) -> &Element {
        &self.value
    }

    /// Source positions of the value nodes. Empty unless the client was
    /// configured to ask for them.
    pub fn positions(&self) -> &PositionTree {
        &self.positions
    }

    /// Opaque server-computed content hash
    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    pub fn last_touch(&self) -> Instant {
        *self.last_touch.lock()
    }

    pub(crate) fn touch(&self) {
        self.touch_at(Instant::now());
    }

    pub(crate) fn touch_at(
        &self,
        at: Instant,
    ) {
        *self.last_touch.lock() = at;
    }
}

impl fmt::Debug for SpecificConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SpecificConfig")
            .field("checksum", &HexBytes(&self.checksum))
            .field("value", &self.value)
            .finish()
    }
}

pub(crate) struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Debug for HexBytes<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for HexBytes<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

//! Per-call limb arenas.
//!
//! An algorithm computes its total scratch need once at the top, allocates a
//! single [`ScratchOwned`], and carves non-aliasing sub-slices off the
//! borrowed [`Scratch`] as it goes. Nothing here escapes the call and no
//! allocation happens inside hot loops.

pub struct ScratchOwned {
    data: Vec<u64>,
}

impl ScratchOwned {
    pub fn new(limbs: usize) -> Self {
        Self { data: vec![0u64; limbs] }
    }

    pub fn borrow(&mut self) -> Scratch<'_> {
        Scratch(&mut self.data)
    }
}

pub struct Scratch<'a>(&'a mut [u64]);

impl<'a> Scratch<'a> {
    /// Splits off the next `limbs` words, zeroed.
    pub fn take(&mut self, limbs: usize) -> &'a mut [u64] {
        let buf = core::mem::take(&mut self.0);
        debug_assert!(limbs <= buf.len(), "scratch overrun");
        let (head, tail) = buf.split_at_mut(limbs);
        self.0 = tail;
        head.fill(0);
        head
    }

    pub fn available(&self) -> usize {
        self.0.len()
    }
}

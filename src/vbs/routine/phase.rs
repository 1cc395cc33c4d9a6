//! Routine phases

use bitflags::bitflags;

bitflags! {
    /// When a routine runs. PRE, MAIN and POST routines see one line at a
    /// time; MULTILINE routines see the whole rendered source at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Phase: u8 {
        const PRE = 0x1;
        const MAIN = 0x2;
        const POST = 0x4;
        const MULTILINE = 0x8;
    }
}

impl Phase {
    /// Every single-line phase.
    pub const LINES: Phase = Phase::PRE.union(Phase::MAIN).union(Phase::POST);

    /// The single-bit phases contained in `self`, least significant first.
    pub fn bits_ascending(self) -> impl Iterator<Item = Phase> {
        (0..u8::BITS)
            .map(|shift| Phase::from_bits_retain(1 << shift))
            .filter(move |bit| self.contains(*bit))
    }
}

pub mod genome;
pub mod motif;
pub mod region;
pub mod sequence;

// re-export for cleaner imports
pub use self::genome::Genome;
pub use self::motif::Motif;
pub use self::region::Region;
pub use self::sequence::{Sequence, SequenceSet};

pub mod highlight;
pub mod weight;

pub use highlight::{diff, opcodes, DiffSpan, DiffSpans, OpTag, Opcode, Side};
pub use weight::weighted_length;

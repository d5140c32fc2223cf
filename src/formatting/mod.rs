pub mod factory;
pub mod formatter;
pub mod normalizer;
pub mod quantity;
pub mod rename;

pub use factory::{FormatterFactory, FormatterTable};
pub use formatter::{Formatter, Predicate};
pub use normalizer::{Normalizer, NormalizerChain};
pub use rename::{Direction, FieldRenameTable};

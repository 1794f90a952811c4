pub mod multiplex;
pub mod records;
pub mod table;

pub use multiplex::*;
pub use records::*;
pub use table::*;

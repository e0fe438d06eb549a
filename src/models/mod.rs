pub mod enums;
pub mod mapping;
pub mod row;
pub mod upload;

pub use enums::*;
pub use mapping::*;
pub use row::*;
pub use upload::*;

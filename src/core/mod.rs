pub mod message;
pub mod mode;
pub mod object;
pub mod payload;
pub mod util;

pub mod category;
pub mod measurement;

pub use category::Category;
pub use measurement::{decode, encode, MeasuredValue, Measurement, ParseError};

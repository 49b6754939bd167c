pub mod awesomeapi;
pub mod util;

pub use awesomeapi::AwesomeApiProvider;

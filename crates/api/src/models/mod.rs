//! Domain types for the API.

pub mod address;
pub mod area;
pub mod session;
pub mod user;

pub use address::{AddressDetail, NewAddress};
pub use area::Area;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;

pub mod auth;
pub mod entity;
pub mod invoice;
pub mod issuer;
pub mod recipient;
pub mod role;
pub mod user;
pub mod values;

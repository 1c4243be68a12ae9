pub mod api;
pub mod egress;
pub mod record;
pub mod room;
pub mod tokens;

pub mod client;
pub mod feedback;
pub mod inbox;

pub mod creator_feedback;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod reactions;
pub mod replies;
pub mod routes;

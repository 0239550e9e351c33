pub mod dispatcher;
pub mod presence;

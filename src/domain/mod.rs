pub mod generation;
pub mod moderation;
pub mod quota;

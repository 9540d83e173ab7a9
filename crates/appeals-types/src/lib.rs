pub mod models;

pub use models::{Appeal, AppealStats, AppealStatus, AppealType, UnknownVariant};

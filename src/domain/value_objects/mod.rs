pub mod enums;
pub mod plan_limits;

pub mod money;
pub mod reference;

pub mod apy;
pub mod impermanent_loss;

pub use apy::{annualize_return, daily_yield};
pub use impermanent_loss::il_percent;

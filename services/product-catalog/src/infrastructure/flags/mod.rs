//! 特性开关提供方

mod flagd;
mod static_flags;

pub use flagd::FlagdFeatureFlags;
pub use static_flags::StaticFeatureFlags;

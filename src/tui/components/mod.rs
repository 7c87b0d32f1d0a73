//! Single-line bars shared by every layout.

pub mod period_bar;
pub mod status_bar;

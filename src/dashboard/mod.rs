//! Dashboard module
//!
//! Provides an overview page summarising the user's budgets: how much has
//! been spent, how many budgets have been reached, a chart of target vs
//! spent per budget and the latest activity.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;

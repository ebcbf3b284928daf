pub use alerts::{AlertEvent, AlertScope, evaluate_alerts};
pub use analysis::{
    AnalysisSnapshot, CategoryUsage, MonthlySpending, MonthlySummary, SavingsProgress,
    ScopeUsage, SpendingTotals,
};
pub use category::Category;
pub use error::EngineError;
pub use limits::{LimitProfile, LimitUpdate};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use threshold::{UsageStatus, crossed};
pub use timezone::{Window, Windows, offset_minutes, supported_regions};
pub use transactions::{Direction, Transaction};
pub use users::{NotificationPreferences, PreferencesUpdate};

mod alerts;
mod analysis;
mod category;
mod error;
mod money;
mod ops;
mod threshold;
mod util;

pub mod limits;
pub mod timezone;
pub mod transactions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;

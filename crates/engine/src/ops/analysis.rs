use chrono::{DateTime, Utc};

use crate::{AnalysisSnapshot, ResultEngine};

use super::Engine;

impl Engine {
    /// Full spending analysis for `username` at `now`.
    ///
    /// A user without stored limits gets a snapshot where every scope
    /// reports "no limit configured".
    pub async fn analyze(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<AnalysisSnapshot> {
        let limits = self.limits(username).await?;
        let totals = self.spending_totals(username, now).await?;
        Ok(AnalysisSnapshot::compute(limits, totals))
    }
}

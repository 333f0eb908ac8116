//! # Analytics Service
//!
//! Reports over order history and current stock. Each call reads one
//! snapshot of orders and items on a single connection and hands it to the
//! pure functions in `depot_core::analytics`.
//!
//! Every report requires `ViewReports` (admin and manager).

use depot_core::analytics::{
    self, DashboardSummary, ForecastRow, ItemFrequency, ProfitReport, RevenueTrend,
    TurnoverReport,
};
use depot_core::{Action, InventoryItem, Order};

use crate::error::ApiResult;
use crate::services::Gate;
use crate::state::Session;
use crate::AppContext;

pub struct AnalyticsService {
    ctx: AppContext,
}

impl AnalyticsService {
    pub fn new(ctx: AppContext) -> Self {
        AnalyticsService { ctx }
    }

    async fn snapshot(&self, session: &Session) -> ApiResult<(Vec<Order>, Vec<InventoryItem>)> {
        Gate::check(session, Action::ViewReports)?;

        let db = self.ctx.db();
        let mut conn = db.acquire().await?;
        let orders = db.orders().list(&mut conn).await?;
        let items = db.inventory().list(&mut conn).await?;
        Ok((orders, items))
    }

    pub async fn profit_margin(&self, session: &Session) -> ApiResult<ProfitReport> {
        let (orders, _) = self.snapshot(session).await?;
        Ok(analytics::profit_margin(&orders))
    }

    pub async fn inventory_turnover(&self, session: &Session) -> ApiResult<TurnoverReport> {
        let (orders, items) = self.snapshot(session).await?;
        Ok(analytics::inventory_turnover(&orders, &items))
    }

    /// Daily revenue for the last `days` days (configured default when
    /// `None`).
    pub async fn revenue_trend(&self, session: &Session, days: Option<i64>) -> ApiResult<RevenueTrend> {
        let (orders, _) = self.snapshot(session).await?;
        let days = days.unwrap_or(self.ctx.config().trend_days);
        Ok(analytics::revenue_trend(&orders, days, self.ctx.today()))
    }

    /// Items projected under their minimum within `days_ahead` days
    /// (configured default when `None`).
    pub async fn low_stock_forecast(
        &self,
        session: &Session,
        days_ahead: Option<i64>,
    ) -> ApiResult<Vec<ForecastRow>> {
        let (orders, items) = self.snapshot(session).await?;
        let days_ahead = days_ahead.unwrap_or(self.ctx.config().forecast_days);
        Ok(analytics::low_stock_forecast(&orders, &items, days_ahead))
    }

    pub async fn order_frequency(&self, session: &Session) -> ApiResult<Vec<ItemFrequency>> {
        let (orders, items) = self.snapshot(session).await?;
        Ok(analytics::order_frequency(&orders, &items))
    }

    pub async fn dashboard(&self, session: &Session) -> ApiResult<DashboardSummary> {
        let (orders, items) = self.snapshot(session).await?;
        let config = self.ctx.config();
        Ok(analytics::dashboard_summary(
            &orders,
            &items,
            self.ctx.today(),
            config.trend_days,
            config.forecast_days,
        ))
    }
}

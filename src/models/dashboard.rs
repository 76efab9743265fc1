// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Indicadores agregados do painel inicial.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_classes: i64,
    pub total_teachers: i64,

    pub sessions_today: i64,
    pub present_today: i64,

    // Percentual de presença dos últimos 30 dias (0 a 100)
    #[schema(value_type = f64, example = 87.5)]
    pub attendance_rate_30d: Option<Decimal>,

    // Média das avaliações de professor nos relatórios (1 a 5)
    #[schema(value_type = f64, example = 4.2)]
    pub average_rating: Option<Decimal>,

    pub messages_sent_7d: i64,
    pub messages_failed_7d: i64,
}

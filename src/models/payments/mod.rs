//! 支付记录

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{ExportFormat, PaginationInfo, PaginationQuery};
use crate::models::learning::Enrollment;

pub const DEFAULT_PAYMENT_METHOD: &str = "bank_transfer";

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
    pub enum PaymentStatus {
        Pending => "pending",
        WaitingConfirm => "waiting_confirm",
        Success => "success",
        Failed => "failed",
        Rejected => "rejected",
    }
}

impl PaymentStatus {
    /// 仍在处理中，会阻止重复下单
    pub fn is_open(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::WaitingConfirm)
    }

    /// 学生确认转账的起始状态
    pub const CONFIRMABLE: &'static [PaymentStatus] = &[PaymentStatus::Pending];
    /// 学生取消的起始状态
    pub const CANCELLABLE: &'static [PaymentStatus] =
        &[PaymentStatus::Pending, PaymentStatus::WaitingConfirm];
    /// 管理员驳回的起始状态，成功支付除外
    pub const REJECTABLE: &'static [PaymentStatus] = &[
        PaymentStatus::Pending,
        PaymentStatus::WaitingConfirm,
        PaymentStatus::Failed,
        PaymentStatus::Rejected,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub amount: i64,
    pub method: String,
    pub status: PaymentStatus,
    /// 驳回原因
    pub note: Option<String>,
    pub paid_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 附带学生与课程信息的支付记录
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub payment: Payment,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub course_title: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<PaymentStatus>,
    pub search: Option<String>,
    /// YYYY-MM-DD，含当天
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentExportParams {
    pub status: Option<PaymentStatus>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentHistoryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<PaymentStatus>,
}

/// 存储层查询，时间为 unix 秒，`[from_ts, to_ts)`
#[derive(Debug, Clone, Default)]
pub struct PaymentListQuery {
    pub page: u64,
    pub size: u64,
    pub status: Option<PaymentStatus>,
    pub search: Option<String>,
    pub from_ts: Option<i64>,
    pub to_ts: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct CreatePaymentRequest {
    pub course_id: i64,
    pub method: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentListResponse {
    pub items: Vec<PaymentDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentTotals {
    pub pending: i64,
    pub waiting_confirm: i64,
    pub success: i64,
    pub failed: i64,
    pub rejected: i64,
    pub total_spent: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentHistoryResponse {
    pub items: Vec<PaymentDetail>,
    pub pagination: PaginationInfo,
    pub totals: PaymentTotals,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentApprovalResponse {
    pub payment: Payment,
    pub enrollment: Enrollment,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct CleanupResponse {
    pub deleted: u64,
}

/// 条件状态变更的结果
#[derive(Debug, Clone)]
pub enum PaymentTransition {
    Changed(Payment),
    NotFound,
    /// 当前状态不在允许的起始状态内，可能已被并发请求修改
    Rejected { current: PaymentStatus },
}

/// 审核通过支付的结果
#[derive(Debug, Clone)]
pub enum PaymentApproval {
    Approved {
        payment: Payment,
        enrollment: Enrollment,
    },
    NotFound,
    AlreadySucceeded,
}

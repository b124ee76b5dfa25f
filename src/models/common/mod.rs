pub mod pagination;
pub mod response;

use serde::Deserialize;
use ts_rs::TS;

pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::{ApiResponse, BulkOperationResponse};

super::string_enum! {
    /// 导出文件格式
    #[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
    pub enum ExportFormat {
        Csv => "csv",
        Xlsx => "xlsx",
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Csv
    }
}

/// 批量操作请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
pub struct IdsRequest {
    pub ids: Vec<i64>,
}

/// 驳回 / 拒绝时附带的原因
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/common.ts")]
pub struct ReasonRequest {
    pub reason: String,
}

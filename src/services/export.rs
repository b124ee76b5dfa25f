//! CSV / XLSX 下载
//!
//! XLSX 每个工作表只有加粗的表头，CSV 只输出第一个工作表。

use actix_web::HttpResponse;
use rust_xlsxwriter::{Format, Workbook};
use tracing::error;

use crate::errors::{LearnHubError, Result};
use crate::models::{ApiResponse, ErrorCode, ExportFormat};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn as_csv(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, headers: &[&'static str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

pub fn render_csv(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&sheet.headers)
        .map_err(|e| LearnHubError::export(format!("CSV 写入失败: {e}")))?;
    for row in &sheet.rows {
        wtr.write_record(row.iter().map(Cell::as_csv))
            .map_err(|e| LearnHubError::export(format!("CSV 写入失败: {e}")))?;
    }
    wtr.into_inner()
        .map_err(|e| LearnHubError::export(format!("CSV 生成失败: {e}")))
}

pub fn render_xlsx(sheets: &[Sheet]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| LearnHubError::export(format!("XLSX 写入失败: {e}"));

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(xlsx_err)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &header_format)
                .map_err(xlsx_err)?;
        }

        for (row, cells) in sheet.rows.iter().enumerate() {
            let row = (row + 1) as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(s) => worksheet.write_string(row, col, s),
                    Cell::Number(n) => worksheet.write_number(row, col, *n),
                }
                .map_err(xlsx_err)?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| LearnHubError::export(format!("XLSX 生成失败: {e}")))
}

/// 按格式生成下载响应；`base_name` 不含扩展名
pub fn download(base_name: &str, format: ExportFormat, sheets: &[Sheet]) -> HttpResponse {
    let rendered = match format {
        ExportFormat::Xlsx => render_xlsx(sheets).map(|data| (data, XLSX_CONTENT_TYPE)),
        ExportFormat::Csv => match sheets.first() {
            Some(sheet) => render_csv(sheet).map(|data| (data, "text/csv; charset=utf-8")),
            None => Err(LearnHubError::export("Nothing to export")),
        },
    };

    match rendered {
        Ok((data, content_type)) => HttpResponse::Ok()
            .content_type(content_type)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{base_name}.{format}\""),
            ))
            .body(data),
        Err(e) => {
            error!("导出 {base_name} 失败: {e}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(ErrorCode::ExportFailed, e.message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sheet {
        let mut sheet = Sheet::new("Users", &["id", "name"]);
        sheet.push(vec![1_i64.into(), "Ada, Countess".into()]);
        sheet.push(vec![2_i64.into(), "Linus".into()]);
        sheet
    }

    #[test]
    fn test_csv_quotes_commas() {
        let data = String::from_utf8(render_csv(&sample()).unwrap()).unwrap();
        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines[0], "id,name");
        assert_eq!(lines[1], "1,\"Ada, Countess\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_xlsx_is_zip() {
        let data = render_xlsx(&[sample(), Sheet::new("Empty", &["x"])]).unwrap();
        assert_eq!(&data[..2], b"PK");
    }

    #[test]
    fn test_download_headers() {
        let resp = download("users", ExportFormat::Csv, &[sample()]);
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"users.csv\"");
    }
}

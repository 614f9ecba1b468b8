// src/common/csv_export.rs

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::common::error::AppError;

/// Serializa as linhas em CSV (cabeçalho tirado dos nomes dos campos).
pub fn render_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao finalizar CSV: {}", e)))
}

// Resposta de download com o nome de arquivo sugerido
pub fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        description: String,
        quantity: i64,
    }

    #[test]
    fn test_render_csv_with_header() {
        let rows = vec![
            Row { description: "Venda, balcão".into(), quantity: 10 },
            Row { description: "Compra".into(), quantity: -3 },
        ];
        let out = String::from_utf8(render_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "description,quantity");
        assert_eq!(lines[1], "\"Venda, balcão\",10");
        assert_eq!(lines[2], "Compra,-3");
    }

    #[test]
    fn test_render_csv_empty() {
        let rows: Vec<Row> = Vec::new();
        assert!(render_csv(&rows).unwrap().is_empty());
    }
}

//! services/api/src/bin/openapi.rs
//!
//! This binary generates the OpenAPI 3.0 document for the REST API
//! and saves it to a file named `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

/// Renders the OpenAPI document and writes it to a file.
fn write_openapi_document(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let document_json = api_doc.to_pretty_json()?;
    std::fs::write(path, document_json)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    write_openapi_document(ApiDoc::openapi(), &path)?;
    Ok(())
}

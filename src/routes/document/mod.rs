mod handler;
mod model;

pub use handler::{delete_document, get_document, list_documents, upload_document};
pub use model::DocumentInfo;

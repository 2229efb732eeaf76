// Résumé ingestion: upload ownership and text extraction.
// Nothing here talks to the model provider.

pub mod extract;
pub mod upload;

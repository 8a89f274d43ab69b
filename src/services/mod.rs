pub mod identity_extractor;

pub use identity_extractor::{parse_identity, IdentityExtractor, PdfIdentityExtractor};

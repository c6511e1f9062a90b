//! Role codecs: the compact binary wire/replication format and the structured document format.
//! Both must read back exactly what they wrote; the superuser flag survives neither.

pub mod binary;
pub mod document;

pub use binary::{Readable, StreamInput, StreamOutput, Writeable};
pub use document::{DocumentBuilder, Token, TokenCursor};

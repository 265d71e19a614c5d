//! Company SOAP service: templates, client, field extraction

pub mod client;
pub mod extract;
pub mod template;

pub use client::SoapClient;
pub use extract::{parse_timestamp, FieldExtractor};
pub use template::{tokens, SoapOperation, SoapTemplate, TemplateSet};

//! Data models: canonical articles, per-source raw records, enums and tool inputs.
//!
//! Raw records use `#[serde(default)]` on every field so partial upstream payloads
//! still decode; canonical records serialize in camelCase.

mod article;
mod enums;
mod inputs;
mod raw;

pub use article::{Article, EnhancedArticle};
pub use enums::{ResponseFormat, ScoringMode, SortOption, SourceKind};
pub use inputs::*;
pub use raw::{
    ArxivEntry, CoreAuthor, CoreItem, CoreResponse, CrossrefAuthor, CrossrefDate, CrossrefItem,
    CrossrefMessage, CrossrefResponse, PwcPaper, PwcRepository, PwcResponse, PwcResult, RawRecord,
};

/// Catalog identifiers (course, chapter, section, lesson) are opaque
/// strings minted by the catalog on insert.
pub type ContentId = String;

/// Learner identifiers are the opaque subject issued by the identity provider.
pub type LearnerId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

//! Document contract for the search index.
//!
//! Any type stored through the repository implements [`SearchDocument`]. The
//! repository never inspects the document beyond serializing it and reading
//! its identifier.

use serde::{Deserialize, Serialize};

/// Capability a caller's entity type provides to be stored in a search index.
///
/// The repository serializes the value returned by [`to_document`](Self::to_document)
/// as the document body and stores it under [`document_id`](Self::document_id).
///
/// Identifiers are passed through to the search engine unchanged. An empty or
/// otherwise invalid identifier is rejected by the engine, not by the repository,
/// so validation belongs to the caller's domain layer.
///
/// # Example
///
/// ```
/// use document_search_shared::{SearchDocument, Suggestion};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct CourseDoc {
///     title: String,
///     title_suggest: Suggestion,
/// }
///
/// struct Course {
///     code: String,
///     title: String,
/// }
///
/// impl SearchDocument for Course {
///     type Document = CourseDoc;
///
///     fn to_document(&self) -> CourseDoc {
///         CourseDoc {
///             title: self.title.clone(),
///             title_suggest: Suggestion::new(vec![self.title.clone()], 1),
///         }
///     }
///
///     fn document_id(&self) -> String {
///         self.code.clone()
///     }
/// }
///
/// let course = Course { code: "2110101".to_string(), title: "Computer Programming".to_string() };
/// assert_eq!(course.document_id(), "2110101");
/// ```
pub trait SearchDocument: Send + Sync {
    /// The serializable representation written to the index.
    type Document: Serialize;

    /// Produce the document body for this entity.
    fn to_document(&self) -> Self::Document;

    /// The identifier the document is stored under.
    fn document_id(&self) -> String;
}

/// Completion suggester payload.
///
/// Stored in a `completion` field of a document; `weight` ranks the candidate
/// among other completions matching the same prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    /// Inputs the completion matches on.
    pub input: Vec<String>,
    /// Caller-supplied ranking score.
    pub weight: i32,
}

impl Suggestion {
    /// Create a new suggestion payload.
    pub fn new(input: Vec<String>, weight: i32) -> Self {
        Self { input, weight }
    }
}

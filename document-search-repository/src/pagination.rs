//! Pagination metadata computation from a search response envelope.

use serde_json::Value;

use crate::errors::RepositoryError;
use document_search_shared::PaginationMetadata;

/// Fill in `meta` from a completed search response.
///
/// Reads `hits.total.value` as the total match count and the length of
/// `hits.hits` as the number of items on this page. The envelope is not
/// modified. A missing or mistyped key is an error rather than a zero.
///
/// # Returns
///
/// * `Ok(())` - `meta.total_item`, `meta.total_page` and `meta.item_count` are set
/// * `Err(RepositoryError::ValidationError)` - If `meta.items_per_page` is zero
/// * `Err(RepositoryError::MalformedResponse)` - If the envelope does not have the expected shape
pub fn compute_metadata(
    meta: &mut PaginationMetadata,
    envelope: &Value,
) -> Result<(), RepositoryError> {
    if meta.items_per_page == 0 {
        return Err(RepositoryError::validation(
            "items_per_page must be greater than zero",
        ));
    }

    let hits = envelope
        .get("hits")
        .and_then(Value::as_object)
        .ok_or_else(|| RepositoryError::malformed_response("missing object `hits`"))?;

    let total_item = hits
        .get("total")
        .and_then(|total| total.get("value"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            RepositoryError::malformed_response("missing non-negative integer `hits.total.value`")
        })?;

    let item_count = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(Vec::len)
        .ok_or_else(|| RepositoryError::malformed_response("missing array `hits.hits`"))?;

    let total_item = usize::try_from(total_item).map_err(|_| {
        RepositoryError::malformed_response(format!("`hits.total.value` {} out of range", total_item))
    })?;

    meta.set_totals(total_item, item_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(total: u64, page_hits: usize) -> Value {
        let hits: Vec<Value> = (0..page_hits)
            .map(|i| json!({ "_id": i.to_string(), "_score": 1.0, "_source": {} }))
            .collect();
        json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": { "value": total, "relation": "eq" },
                "max_score": 1.0,
                "hits": hits
            }
        })
    }

    #[test]
    fn test_compute_metadata() {
        let mut meta = PaginationMetadata::new(1, 10);
        compute_metadata(&mut meta, &envelope(25, 10)).unwrap();

        assert_eq!(meta.total_item, 25);
        assert_eq!(meta.total_page, 3);
        assert_eq!(meta.item_count, 10);
    }

    #[test]
    fn test_exact_multiple() {
        let mut meta = PaginationMetadata::new(2, 10);
        compute_metadata(&mut meta, &envelope(20, 10)).unwrap();

        assert_eq!(meta.total_page, 2);
    }

    #[test]
    fn test_no_results() {
        let mut meta = PaginationMetadata::new(1, 10);
        compute_metadata(&mut meta, &envelope(0, 0)).unwrap();

        assert_eq!(meta.total_item, 0);
        assert_eq!(meta.total_page, 0);
        assert_eq!(meta.item_count, 0);
    }

    #[test]
    fn test_item_count_uses_returned_hits() {
        // Last page of 25 results with 10 per page holds 5 hits.
        let mut meta = PaginationMetadata::new(3, 10);
        compute_metadata(&mut meta, &envelope(25, 5)).unwrap();
        assert_eq!(meta.item_count, 5);

        // The engine is authoritative even when it disagrees with the arithmetic.
        let mut meta = PaginationMetadata::new(1, 10);
        compute_metadata(&mut meta, &envelope(25, 7)).unwrap();
        assert_eq!(meta.item_count, 7);
    }

    #[test]
    fn test_envelope_is_not_modified() {
        let body = envelope(12, 2);
        let before = body.clone();

        let mut meta = PaginationMetadata::new(1, 2);
        compute_metadata(&mut meta, &body).unwrap();

        assert_eq!(body, before);
    }

    #[test]
    fn test_missing_hits() {
        let mut meta = PaginationMetadata::new(1, 10);
        let result = compute_metadata(&mut meta, &json!({ "took": 1 }));
        assert!(matches!(result, Err(RepositoryError::MalformedResponse(_))));
    }

    #[test]
    fn test_missing_total_value() {
        let mut meta = PaginationMetadata::new(1, 10);
        let body = json!({ "hits": { "total": { "relation": "eq" }, "hits": [] } });

        let result = compute_metadata(&mut meta, &body);

        assert!(matches!(result, Err(RepositoryError::MalformedResponse(_))));
        assert_eq!(meta.total_item, 0);
        assert_eq!(meta.total_page, 0);
    }

    #[test]
    fn test_legacy_integer_total_is_rejected() {
        let mut meta = PaginationMetadata::new(1, 10);
        let body = json!({ "hits": { "total": 5, "hits": [] } });

        let result = compute_metadata(&mut meta, &body);
        assert!(matches!(result, Err(RepositoryError::MalformedResponse(_))));
    }

    #[test]
    fn test_hits_not_an_array() {
        let mut meta = PaginationMetadata::new(1, 10);
        let body = json!({ "hits": { "total": { "value": 3 }, "hits": {} } });

        let result = compute_metadata(&mut meta, &body);
        assert!(matches!(result, Err(RepositoryError::MalformedResponse(_))));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut meta = PaginationMetadata::new(1, 0);
        let result = compute_metadata(&mut meta, &envelope(10, 0));
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }
}

use serde::Serialize;
use utoipa::ToSchema;

/// Listing metadata. Paged lists fill all three fields, batched lookups only
/// carry `total`.
#[derive(Debug, Serialize, ToSchema, Clone, Default)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn count(total: usize) -> Self {
        Self {
            total: Some(i64::try_from(total).unwrap_or(i64::MAX)),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    /// Single-resource read.
    pub fn ok(data: T) -> Self {
        Self::success("OK", data, Some(Meta::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_meta_leaves_paging_empty() {
        let value = serde_json::to_value(Meta::count(3)).unwrap();
        assert_eq!(value, json!({ "page": null, "per_page": null, "total": 3 }));
    }

    #[test]
    fn ok_wraps_data_with_empty_meta() {
        let resp = ApiResponse::ok(json!({ "allowed": true }));
        assert_eq!(resp.message, "OK");
        assert_eq!(resp.data, Some(json!({ "allowed": true })));
        assert!(resp.meta.is_some_and(|m| m.total.is_none()));
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JWT claims issued by the identity service.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub tenant_id: Uuid,
    #[serde(default)]
    pub business_id: Option<Uuid>,
    pub exp: usize,
}

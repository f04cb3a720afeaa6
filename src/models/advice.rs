use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sustainability tip generated for a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AdviceItem {
    /// Stable slug; the same situation always yields the same id
    pub id: String,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "urgente")]
    pub urgent: bool,
    #[serde(rename = "cumplido")]
    pub completed: bool,
}

/// Request payload for marking an advice item as completed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "consejo_id": "desconectar-standby" }))]
pub struct CompleteAdviceRequest {
    #[serde(rename = "consejo_id", alias = "advice_id")]
    pub advice_id: String,
}

/// Outcome of marking an advice item as completed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AdviceCompletion {
    #[serde(rename = "consejo_id")]
    pub advice_id: String,
    /// Points the user holds after the operation
    #[serde(rename = "puntos_sostenibilidad")]
    pub points: u32,
    /// Points granted by this call; 0 when the item was already completed
    #[serde(rename = "otorgados")]
    pub awarded: u32,
}

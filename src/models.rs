pub mod advice;
pub mod appliance;
pub mod auth;
pub mod catalog;
pub mod invoice;
pub mod metrics;
pub mod user;

pub use advice::{AdviceCompletion, AdviceItem, CompleteAdviceRequest};
pub use appliance::{
    Appliance, ApplianceResponse, CreateApplianceRequest, EfficiencyLabel, UpdateApplianceRequest,
};
pub use auth::{AuthToken, LoginRequest};
pub use catalog::{APPLIANCE_CATALOG, Archetype, CatalogEntry};
pub use invoice::{CreateInvoiceRequest, Invoice, Month};
pub use metrics::{
    ActivitySummary, ApplianceBreakdown, ConsumptionRequest, CostEstimate, DataStatus,
    FootprintEstimate, MetricsSummary, ProfileMetrics,
};
pub use user::{CreateUserRequest, SubsidyTier, UpdateUserRequest, User, UserChanges};

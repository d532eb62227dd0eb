//! Data models for studymap-ra (Resource Aggregator microservice)

pub mod plan;
pub mod resource;

pub use plan::{Phase, Plan, PlanDay};
pub use resource::{CandidateItem, ResourceRecord, Source, NO_RESULTS_SENTINEL};

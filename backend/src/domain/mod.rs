//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the stability study model independently of HTTP and
//! storage. Inbound adapters call the driving ports (`StudyCommand`,
//! `StudyQuery`); outbound adapters implement the driven port
//! (`StudyRepository`).
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - TraceId: request correlation identifier.
//! - Lote, Study, StudySummary, NewStudy, StudyPatch and friends: the study
//!   aggregate and its validated inputs.
//! - StudyCommandService / StudyQueryService: driving port implementations.

pub mod error;
pub mod ports;
pub mod study;
pub mod study_service;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::study::{
    LOTE_MAX, Lote, NewStudy, NewStudyDraft, ParseStabilityTypeError, StabilityType, Study,
    StudyDetails, StudyFilter, StudyId, StudyKey, StudyPatch, StudyResult, StudyResultDraft,
    StudySummary, StudyUpdate, StudyValidationError,
};
pub use self::study_service::{StudyCommandService, StudyQueryService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

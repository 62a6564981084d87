//! HTTP-client-backed implementations of the external collaborator ports
//! `srs-tasks` defines (`spec.md` §4.7-§4.8). The services themselves are
//! out of scope; this is only the `reqwest` boundary the teacher pack
//! uses for similar calls (`learn_hobby::services::WritingToolsService`).

pub mod content_generator;
pub mod semantic_grader;

pub use content_generator::HttpContentGenerator;
pub use semantic_grader::HttpSemanticGrader;

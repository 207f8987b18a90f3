pub mod corpus;
pub mod detect;
pub mod extract;
pub mod report;
pub mod survey;

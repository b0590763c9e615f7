pub mod ask;
pub mod correct;
pub mod doctor;
pub mod feedback;
pub mod maturity;
pub mod search;
pub mod stats;
pub mod teach;

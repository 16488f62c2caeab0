// Domain layer - Launch records, windows, selection and aggregation
pub mod histogram;
pub mod launch;
pub mod selection;
pub mod window;

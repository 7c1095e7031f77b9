pub mod calibrate;
pub mod health;
pub mod ingest;
pub mod recommend;
pub mod signals;
pub mod stats;
pub mod ws;

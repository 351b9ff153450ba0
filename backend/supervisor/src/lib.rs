pub mod supervisor;

pub use supervisor::{IngressRouter, Supervisor, SupervisorOptions, DEFAULT_QUEUE_CAPACITY};

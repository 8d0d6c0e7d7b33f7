//! # Moneto Backend
//!
//! Monthly envelope planning: the allocation engine and its services
//! (`domain`), and file-backed persistence (`storage`).
//!
//! All operations are synchronous; the library has no UI or network layer.

use anyhow::Result;
use std::path::Path;

pub mod domain;
pub mod storage;

// Re-export commonly used types
pub use domain::{ExportService, NotificationService, PlanService, PlanServiceError};
pub use storage::csv::CsvConnection;

/// Main backend struct wiring the services to one data directory
pub struct Backend {
    pub connection: CsvConnection,
    pub plan_service: PlanService<CsvConnection>,
}

impl Backend {
    /// Backend on `data_directory`, created if missing
    pub fn new<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        Ok(Self::from_connection(CsvConnection::new(data_directory)?))
    }

    /// Backend on `$MONETO_DATA_DIR`, else `<documents>/Moneto`
    pub fn new_default() -> Result<Self> {
        Ok(Self::from_connection(CsvConnection::new_default()?))
    }

    fn from_connection(connection: CsvConnection) -> Self {
        let plan_service = PlanService::new(&connection);
        Self {
            connection,
            plan_service,
        }
    }
}

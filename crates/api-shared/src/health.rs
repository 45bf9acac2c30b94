use crate::dto::{BannerRes, HealthRes};

/// Simple health service used by the REST gateway.
///
/// This service provides a standardised way to report liveness and the service banner.
#[derive(Clone, Debug)]
pub struct HealthService {
    app_name: String,
    clinic_name: String,
    version: String,
}

impl HealthService {
    /// Creates a new instance of HealthService.
    ///
    /// # Arguments
    /// * `app_name` - Reported as the `service` in health checks
    /// * `clinic_name` - Reported in the banner
    /// * `version` - Reported in the banner
    pub fn new(
        app_name: impl Into<String>,
        clinic_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            clinic_name: clinic_name.into(),
            version: version.into(),
        }
    }

    /// Liveness response. The process answering is the only check.
    pub fn check_health(&self) -> HealthRes {
        HealthRes {
            status: "healthy".into(),
            service: self.app_name.clone(),
        }
    }

    pub fn banner(&self) -> BannerRes {
        BannerRes {
            message: format!("Welcome to {} API", self.app_name),
            clinic: self.clinic_name.clone(),
            version: self.version.clone(),
        }
    }
}

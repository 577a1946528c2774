//! Activity registry service

use booking_core::{models::Activity, traits::ActivityRepository, AppError, AppResult};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct ActivityService<A: ActivityRepository> {
    activities: Arc<A>,
}

impl<A: ActivityRepository> ActivityService<A> {
    pub fn new(activities: Arc<A>) -> Self {
        Self { activities }
    }

    #[instrument(skip(self))]
    pub async fn add_activity(&self, name: &str) -> AppResult<Activity> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "activity name must not be empty".to_string(),
            ));
        }

        let activity = self.activities.create(&Activity::new(name)).await?;
        info!("Activity {} added", activity.name);
        Ok(activity)
    }

    #[instrument(skip(self))]
    pub async fn remove_activity(&self, name: &str) -> AppResult<()> {
        if !self.activities.delete(name).await? {
            return Err(AppError::ActivityNotFound(name.to_string()));
        }
        info!("Activity {} removed", name);
        Ok(())
    }

    /// Look an activity up by name
    pub async fn check_activity(&self, name: &str) -> AppResult<Activity> {
        self.activities
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::ActivityNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_db::MemoryActivityRepository;

    fn service() -> ActivityService<MemoryActivityRepository> {
        ActivityService::new(Arc::new(MemoryActivityRepository::new()))
    }

    #[tokio::test]
    async fn test_activity_lifecycle() {
        let service = service();
        service.add_activity("yoga").await.unwrap();
        assert_eq!(service.check_activity("yoga").await.unwrap().name, "yoga");

        assert!(matches!(
            service.add_activity("yoga").await,
            Err(AppError::AlreadyExists(_))
        ));

        service.remove_activity("yoga").await.unwrap();
        assert!(matches!(
            service.check_activity("yoga").await,
            Err(AppError::ActivityNotFound(_))
        ));
        assert!(matches!(
            service.remove_activity("yoga").await,
            Err(AppError::ActivityNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        assert!(matches!(
            service().add_activity("").await,
            Err(AppError::Validation(_))
        ));
    }
}

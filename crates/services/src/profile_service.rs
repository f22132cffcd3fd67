use std::sync::Arc;

use buddy_core::model::UserProfile;
use storage::repository::ProfileRepository;

use crate::error::ProfileServiceError;

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    /// Load the stored profile (or the default if none was saved).
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` on storage failures.
    pub async fn load(&self) -> Result<UserProfile, ProfileServiceError> {
        let profile = self.repo.get_profile().await?;
        Ok(profile.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for a blank name, or a storage
    /// error if persistence fails.
    pub async fn set_display_name(
        &self,
        display_name: &str,
    ) -> Result<UserProfile, ProfileServiceError> {
        let current = self.load().await?;
        let updated = UserProfile::new(display_name, current.avatar_url().map(str::to_string))?;
        self.repo.save_profile(&updated).await?;
        Ok(updated)
    }

    /// Set or clear (`None`) the avatar.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for an invalid URL, or a storage
    /// error if persistence fails.
    pub async fn set_avatar_url(
        &self,
        avatar_url: Option<String>,
    ) -> Result<UserProfile, ProfileServiceError> {
        let current = self.load().await?;
        let updated = UserProfile::new(current.display_name(), avatar_url)?;
        self.repo.save_profile(&updated).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::model::ProfileError;
    use storage::repository::InMemoryRepository;

    fn service() -> ProfileService {
        ProfileService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn missing_profile_loads_default() {
        let profile = service().load().await.unwrap();
        assert_eq!(profile, UserProfile::default());
    }

    #[tokio::test]
    async fn updates_keep_the_other_field() {
        let service = service();
        service
            .set_avatar_url(Some("https://example.com/me.png".into()))
            .await
            .unwrap();
        let renamed = service.set_display_name("  Linus ").await.unwrap();
        assert_eq!(renamed.display_name(), "Linus");
        assert_eq!(renamed.avatar_url(), Some("https://example.com/me.png"));

        let cleared = service.set_avatar_url(None).await.unwrap();
        assert_eq!(cleared.display_name(), "Linus");
        assert_eq!(cleared.avatar_url(), None);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let service = service();
        assert!(matches!(
            service.set_display_name("   ").await,
            Err(ProfileServiceError::Profile(ProfileError::EmptyDisplayName))
        ));
        assert!(matches!(
            service.set_avatar_url(Some("not a url".into())).await,
            Err(ProfileServiceError::Profile(ProfileError::InvalidAvatarUrl))
        ));
    }
}

use thiserror::Error;
use url::Url;

const DEFAULT_DISPLAY_NAME: &str = "Coder";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("invalid avatar URL")]
    InvalidAvatarUrl,
}

/// Account details shown in the profile menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    display_name: String,
    avatar_url: Option<String>,
}

impl UserProfile {
    /// Validate and normalize profile fields.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the name is blank or the avatar is not a URL
    /// (data URLs are accepted).
    pub fn new(
        display_name: impl Into<String>,
        avatar_url: Option<String>,
    ) -> Result<Self, ProfileError> {
        let display_name = display_name.into().trim().to_string();
        if display_name.is_empty() {
            return Err(ProfileError::EmptyDisplayName);
        }

        let avatar_url = avatar_url
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        if let Some(raw) = avatar_url.as_ref() {
            Url::parse(raw).map_err(|_| ProfileError::InvalidAvatarUrl)?;
        }

        Ok(Self {
            display_name,
            avatar_url,
        })
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Initials used when no avatar is set.
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            avatar_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_validates() {
        let profile = UserProfile::new("  ada lovelace ", Some(String::new())).unwrap();
        assert_eq!(profile.display_name(), "ada lovelace");
        assert_eq!(profile.avatar_url(), None);
        assert_eq!(profile.initials(), "AL");

        assert_eq!(
            UserProfile::new(" ", None).unwrap_err(),
            ProfileError::EmptyDisplayName
        );
        assert_eq!(
            UserProfile::new("Ada", Some("not a url".into())).unwrap_err(),
            ProfileError::InvalidAvatarUrl
        );
    }

    #[test]
    fn accepts_data_url_avatars() {
        let profile =
            UserProfile::new("Ada", Some("data:image/png;base64,AAAA".into())).unwrap();
        assert!(profile.avatar_url().is_some());
    }
}

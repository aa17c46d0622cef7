use uuid::Uuid;

use super::{patch_of, RepoResult, Repository};
use crate::models::{NewTheme, Theme};
use crate::store::Query;

impl Repository<Theme> {
    /// Make `id` the only active theme
    pub async fn activate(&self, id: Uuid) -> RepoResult<Theme> {
        // Fail before deactivating anything if the target is missing
        let target = self.get(id).await?;

        let active = self.list(&Query::new().eq("is_active", true)).await?;
        for theme in active.iter().filter(|t| t.id != id) {
            self.update(theme.id, patch_of("is_active", false)?).await?;
        }

        if target.is_active {
            return Ok(target);
        }
        self.update(id, patch_of("is_active", true)?).await
    }

    /// Insert a theme; one that arrives active goes through [`Self::activate`]
    pub async fn add(&self, new: &NewTheme) -> RepoResult<Theme> {
        if !new.is_active {
            return self.create(new).await;
        }
        let inactive = NewTheme {
            is_active: false,
            ..new.clone()
        };
        let theme = self.create(&inactive).await?;
        self.activate(theme.id).await
    }

    pub async fn active(&self) -> RepoResult<Option<Theme>> {
        let query = Query::new().eq("is_active", true).newest_first().limit(1);
        Ok(self.list(&query).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::NewTheme;
    use crate::repo::tests::repos;
    use uuid::Uuid;

    fn theme(name: &str, is_active: bool) -> NewTheme {
        NewTheme {
            name: name.to_string(),
            primary_color: "#1a2b3c".to_string(),
            secondary_color: "#ffffff".to_string(),
            accent_color: "#ff6600".to_string(),
            background_color: "#fafafa".to_string(),
            text_color: "#111111".to_string(),
            font_family: "Inter".to_string(),
            border_radius: 8,
            is_active,
        }
    }

    #[tokio::test]
    async fn test_activate_leaves_one_active() {
        let repos = repos();
        repos.themes.create(&theme("Light", true)).await.unwrap();
        let dark = repos.themes.create(&theme("Dark", false)).await.unwrap();

        let activated = repos.themes.activate(dark.id).await.unwrap();
        assert!(activated.is_active);

        let active: Vec<_> = repos
            .themes
            .all()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, dark.id);
        assert_eq!(repos.themes.active().await.unwrap().unwrap().id, dark.id);
    }

    #[tokio::test]
    async fn test_add_active_theme_deactivates_others() {
        let repos = repos();
        let light = repos.themes.add(&theme("Light", true)).await.unwrap();
        let dark = repos.themes.add(&theme("Dark", true)).await.unwrap();
        repos.themes.add(&theme("Draft", false)).await.unwrap();

        assert!(dark.is_active);
        assert!(!repos.themes.get(light.id).await.unwrap().is_active);
        let active = repos
            .themes
            .all()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.is_active)
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn test_activate_missing_theme_changes_nothing() {
        let repos = repos();
        let light = repos.themes.create(&theme("Light", true)).await.unwrap();

        assert!(repos.themes.activate(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(repos.themes.get(light.id).await.unwrap().is_active);
    }
}

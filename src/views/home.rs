use std::fmt;

use crate::api::bookings::DEFAULT_RECENT_LIMIT;
use crate::cache::QueryKey;
use crate::errors::ApiError;
use crate::models::{Booking, Category, Provider};
use crate::policy::ViewerRole;

use super::{short_date, ViewContext};

pub const HOME_CATEGORY_LIMIT: usize = 8;
pub const HOME_PROVIDER_LIMIT: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct HomeFeed {
    pub categories: Vec<Category>,
    pub featured_providers: Vec<Provider>,
    /// Present only for signed-in customers and providers.
    pub recent_bookings: Option<Vec<Booking>>,
}

impl fmt::Display for HomeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Categories")?;
        if self.categories.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for category in &self.categories {
            match category.service_count {
                Some(n) => writeln!(f, "  {:<24} {n} services", category.category_name)?,
                None => writeln!(f, "  {}", category.category_name)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Featured providers")?;
        if self.featured_providers.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for provider in &self.featured_providers {
            writeln!(
                f,
                "  {:<24} ★ {:.1} ({} reviews)",
                provider.display_name(),
                provider.rating(),
                provider.total_reviews.unwrap_or(0)
            )?;
        }

        if let Some(recent) = &self.recent_bookings {
            writeln!(f)?;
            writeln!(f, "Recent bookings")?;
            if recent.is_empty() {
                writeln!(f, "  (none)")?;
            }
            for b in recent {
                writeln!(
                    f,
                    "  [{}] {:<24} {} {}",
                    b.booking_id,
                    b.service_name(),
                    short_date(b.scheduled_date),
                    b.booking_status.label()
                )?;
            }
        }

        Ok(())
    }
}

pub struct HomeView {
    ctx: ViewContext,
}

impl HomeView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    /// Loads the catalog sections and, for customers and providers, the
    /// latest bookings. A failed section is logged and left empty.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<HomeFeed, ApiError> {
        let client = &self.ctx.client;
        let cache = &self.ctx.cache;

        let categories = cache.fetch(QueryKey::Categories, || async move { client.categories().await });
        let providers =
            cache.fetch(QueryKey::FeaturedProviders, || async move { client.featured_providers().await });
        let (categories, providers) = tokio::join!(categories, providers);

        let mut categories: Vec<Category> = categories.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load categories");
            Vec::new()
        });
        categories.truncate(HOME_CATEGORY_LIMIT);

        let mut featured_providers: Vec<Provider> = providers.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load featured providers");
            Vec::new()
        });
        featured_providers.truncate(HOME_PROVIDER_LIMIT);

        let recent_bookings = match self.ctx.role() {
            Some(ViewerRole::Customer | ViewerRole::Provider) => {
                let recent = cache
                    .fetch(QueryKey::RecentBookings(DEFAULT_RECENT_LIMIT), || async move {
                        client.recent_bookings(DEFAULT_RECENT_LIMIT).await
                    })
                    .await;
                match recent {
                    Ok(list) => Some(list),
                    Err(e) if e.requires_login() => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to load recent bookings");
                        Some(Vec::new())
                    }
                }
            }
            _ => None,
        };

        Ok(HomeFeed {
            categories,
            featured_providers,
            recent_bookings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_recent_section() {
        let feed = HomeFeed {
            categories: vec![Category {
                category_name: "Plumbing".to_string(),
                service_count: Some(4),
                ..Category::default()
            }],
            featured_providers: vec![Provider {
                business_name: Some("FlowFix".to_string()),
                ..Provider::default()
            }],
            recent_bookings: None,
        };
        let text = feed.to_string();
        assert!(text.contains("Plumbing"));
        assert!(text.contains("4 services"));
        assert!(text.contains("FlowFix"));
        assert!(text.contains("★ 5.0"));
        assert!(!text.contains("Recent bookings"));
    }

    #[test]
    fn test_render_empty_recent_section() {
        let feed = HomeFeed {
            recent_bookings: Some(Vec::new()),
            ..HomeFeed::default()
        };
        assert!(feed.to_string().contains("Recent bookings\n  (none)"));
    }
}

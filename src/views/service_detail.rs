use std::fmt;

use crate::cache::QueryKey;
use crate::errors::ApiError;
use crate::models::ServiceItem;

use super::{money, ViewContext};

pub struct ServiceDetailView {
    ctx: ViewContext,
    service_id: i64,
}

impl ServiceDetailView {
    pub fn new(ctx: ViewContext, service_id: i64) -> Self {
        Self { ctx, service_id }
    }

    pub async fn load(&self) -> Result<ServiceItem, ApiError> {
        let client = &self.ctx.client;
        let id = self.service_id;
        self.ctx
            .cache
            .fetch(QueryKey::Service(id), || async move { client.service(id).await })
            .await
    }
}

/// Plain-text card for a service, shown by `hirelink service`.
pub struct ServiceCard<'a>(pub &'a ServiceItem);

impl fmt::Display for ServiceCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let service = self.0;
        writeln!(f, "{}", service.service_name)?;
        if let Some(category) = &service.category {
            writeln!(f, "Category: {}", category.category_name)?;
        }
        if let Some(description) = &service.service_description {
            writeln!(f)?;
            writeln!(f, "{description}")?;
        }

        writeln!(f)?;
        match service.base_price {
            Some(price) => {
                let unit = match service.price_type.as_deref() {
                    Some("HOURLY") => " / hour",
                    Some("STARTING_FROM") => " onwards",
                    _ => "",
                };
                writeln!(f, "Price: {}{unit}", money(price))?;
            }
            None => writeln!(f, "Price: on inspection")?,
        }
        if let Some(minutes) = service.estimated_duration_minutes {
            writeln!(f, "Duration: about {minutes} min")?;
        }
        if let Some(rating) = service.average_rating {
            writeln!(
                f,
                "Rating: {rating:.1} ({} reviews)",
                service.total_reviews.unwrap_or(0)
            )?;
        }

        if !service.service_highlights.is_empty() {
            writeln!(f)?;
            writeln!(f, "Highlights:")?;
            for highlight in &service.service_highlights {
                writeln!(f, "  - {highlight}")?;
            }
        }
        if service.materials_included {
            match service.materials_description.as_deref() {
                Some(d) => writeln!(f, "Materials included: {d}")?,
                None => writeln!(f, "Materials included")?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Book at least {} hours ahead. Free cancellation up to {} hours before.",
            service.advance_booking_hours(),
            service.cancellation_hours()
        )?;
        if let Some(provider) = &service.provider {
            writeln!(f, "Offered by {} (★ {:.1})", provider.display_name(), provider.rating())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults_booking_windows() {
        let service = ServiceItem {
            service_name: "Deep Cleaning".to_string(),
            base_price: Some(1200.0),
            price_type: Some("FIXED".to_string()),
            ..ServiceItem::default()
        };
        let text = ServiceCard(&service).to_string();
        assert!(text.starts_with("Deep Cleaning\n"));
        assert!(text.contains("Price: ₹1200.00\n"));
        assert!(text.contains("Book at least 2 hours ahead"));
        assert!(text.contains("up to 4 hours before"));
    }

    #[test]
    fn test_render_hourly_and_highlights() {
        let service = ServiceItem {
            service_name: "Electrician Visit".to_string(),
            base_price: Some(300.0),
            price_type: Some("HOURLY".to_string()),
            service_highlights: vec!["Certified staff".to_string()],
            advance_booking_hours: Some(6),
            ..ServiceItem::default()
        };
        let text = ServiceCard(&service).to_string();
        assert!(text.contains("₹300.00 / hour"));
        assert!(text.contains("  - Certified staff"));
        assert!(text.contains("Book at least 6 hours ahead"));
    }
}

use chrono::{NaiveDate, Utc};
use tracing::warn;

use biourb_types::api::{AreaResponse, TreeRequest, TreeResponse};
use biourb_types::models::HealthStatus;

use crate::error::ClientError;
use crate::non_empty;
use crate::session::SessionContext;

/// What the tree registration form holds before submission.
#[derive(Debug, Clone, Default)]
pub struct TreeForm {
    pub tree_name: String,
    pub popular_name: String,
    pub lifecondition: Option<HealthStatus>,
    pub location: String,
    pub planting_date: String,
    pub altura: Option<f64>,
    pub diametro: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub imagem_url: String,
    pub area_verde_id: Option<i64>,
}

impl TreeForm {
    /// Check the form as of `today` and build the request body.
    /// A planting date in the future is refused.
    pub fn validate(&self, today: NaiveDate) -> Result<TreeRequest, ClientError> {
        let tree_name = non_empty(&self.tree_name)
            .ok_or_else(|| ClientError::Validation("Scientific name is required.".into()))?;
        let location = non_empty(&self.location)
            .ok_or_else(|| ClientError::Validation("Location is required.".into()))?;
        let lifecondition = self
            .lifecondition
            .ok_or_else(|| ClientError::Validation("Choose the tree's health.".into()))?;

        let planted = NaiveDate::parse_from_str(self.planting_date.trim(), "%Y-%m-%d")
            .map_err(|_| ClientError::Validation("Enter a valid planting date.".into()))?;
        if planted > today {
            return Err(ClientError::Validation(
                "The planting date cannot be in the future.".into(),
            ));
        }

        Ok(TreeRequest {
            usuario_id: None,
            tree_name: Some(tree_name),
            popular_name: non_empty(&self.popular_name),
            lifecondition: Some(lifecondition.as_str().to_string()),
            location: Some(location),
            planting_date: Some(planted.format("%Y-%m-%d").to_string()),
            altura: self.altura,
            diametro: self.diametro,
            latitude: self.latitude,
            longitude: self.longitude,
            imagem_url: non_empty(&self.imagem_url),
            area_verde_id: self.area_verde_id,
        })
    }
}

/// Tree listing and registration.
#[derive(Debug, Default)]
pub struct TreesPage {
    pub trees: Vec<TreeResponse>,
    /// Options for the green area selector.
    pub areas: Vec<AreaResponse>,
    /// Set when a reload after a saved change failed; the lists may lag the server.
    pub stale: bool,
}

impl TreesPage {
    pub async fn refresh(&mut self, ctx: &SessionContext) -> Result<(), ClientError> {
        self.trees = ctx.client().list_trees().await?;
        self.areas = ctx.client().list_areas().await?;
        self.stale = false;
        Ok(())
    }

    async fn reload_after_write(&mut self, ctx: &SessionContext) {
        if let Err(e) = self.refresh(ctx).await {
            warn!("Tree list reload failed: {}", e);
            self.stale = true;
        }
    }

    /// Register the tree in `form` on behalf of the logged-in user and
    /// return its id. Once the server has accepted the tree this succeeds,
    /// even if the lists cannot be reloaded.
    pub async fn submit(&mut self, ctx: &mut SessionContext, form: &TreeForm) -> Result<i64, ClientError> {
        let session = ctx.require()?.clone();

        let mut req = form.validate(Utc::now().date_naive())?;
        req.usuario_id = Some(session.user.id);

        let created = ctx.client().create_tree(Some(&session), &req).await?;
        self.reload_after_write(ctx).await;
        Ok(created.inserted_id)
    }

    pub async fn delete(&mut self, ctx: &mut SessionContext, tree: &TreeResponse) -> Result<(), ClientError> {
        let session = ctx.require()?.clone();
        if !session.can_modify(tree.usuario_id) {
            return Err(ClientError::Forbidden);
        }

        ctx.client().delete_tree(Some(&session), tree.id).await?;
        self.trees.retain(|t| t.id != tree.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TreeForm {
        TreeForm {
            tree_name: "Caesalpinia echinata".into(),
            popular_name: "Pau-brasil".into(),
            lifecondition: Some(HealthStatus::Healthy),
            location: "Parque da Jaqueira".into(),
            planting_date: "2024-04-22".into(),
            altura: Some(1.8),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn valid_form_builds_request() {
        let req = form().validate(today()).unwrap();
        assert_eq!(req.lifecondition.as_deref(), Some("Saudável"));
        assert_eq!(req.planting_date.as_deref(), Some("2024-04-22"));
        assert_eq!(req.popular_name.as_deref(), Some("Pau-brasil"));
        assert_eq!(req.imagem_url, None);
        assert_eq!(req.usuario_id, None);
    }

    #[test]
    fn future_planting_date_is_refused() {
        let future = TreeForm {
            planting_date: "2024-05-02".into(),
            ..form()
        };
        assert!(matches!(future.validate(today()), Err(ClientError::Validation(_))));

        let same_day = TreeForm {
            planting_date: "2024-05-01".into(),
            ..form()
        };
        assert!(same_day.validate(today()).is_ok());
    }

    #[test]
    fn missing_fields_are_reported() {
        for broken in [
            TreeForm { location: "  ".into(), ..form() },
            TreeForm { tree_name: String::new(), ..form() },
            TreeForm { lifecondition: None, ..form() },
            TreeForm { planting_date: "22/04/2024".into(), ..form() },
        ] {
            assert!(matches!(broken.validate(today()), Err(ClientError::Validation(_))));
        }
    }
}

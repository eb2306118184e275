use tracing::warn;

use biourb_types::api::{AreaRequest, AreaResponse};
use biourb_types::models::AreaStatus;

use crate::error::ClientError;
use crate::non_empty;
use crate::session::SessionContext;

#[derive(Debug, Clone, Default)]
pub struct AreaForm {
    pub nome: String,
    pub descricao: String,
    pub localizacao: String,
    pub responsavel: String,
    pub status: AreaStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub imagem_url: String,
}

impl AreaForm {
    pub fn validate(&self) -> Result<AreaRequest, ClientError> {
        let (Some(nome), Some(localizacao)) = (non_empty(&self.nome), non_empty(&self.localizacao))
        else {
            return Err(ClientError::Validation("Name and location are required.".into()));
        };

        Ok(AreaRequest {
            usuario_id: None,
            nome: Some(nome),
            descricao: non_empty(&self.descricao),
            localizacao: Some(localizacao),
            latitude: self.latitude,
            longitude: self.longitude,
            responsavel: non_empty(&self.responsavel),
            status: Some(self.status.as_str().to_string()),
            imagem_url: non_empty(&self.imagem_url),
        })
    }
}

/// Green area listing, registration and removal.
#[derive(Debug, Default)]
pub struct AreasPage {
    pub areas: Vec<AreaResponse>,
    /// Set when a reload after a saved change failed.
    pub stale: bool,
}

impl AreasPage {
    pub async fn refresh(&mut self, ctx: &SessionContext) -> Result<(), ClientError> {
        self.areas = ctx.client().list_areas().await?;
        self.stale = false;
        Ok(())
    }

    async fn reload_after_write(&mut self, ctx: &SessionContext) {
        if let Err(e) = self.refresh(ctx).await {
            warn!("Green area list reload failed: {}", e);
            self.stale = true;
        }
    }

    pub async fn submit(&mut self, ctx: &mut SessionContext, form: &AreaForm) -> Result<i64, ClientError> {
        let session = ctx.require()?.clone();

        let mut req = form.validate()?;
        req.usuario_id = Some(session.user.id);

        let created = ctx.client().create_area(Some(&session), &req).await?;
        self.reload_after_write(ctx).await;
        Ok(created.inserted_id)
    }

    /// Delete button handler. Offered only to the area's registrant and
    /// administrators.
    pub async fn delete(&mut self, ctx: &mut SessionContext, area: &AreaResponse) -> Result<(), ClientError> {
        let session = ctx.require()?.clone();
        if !session.can_modify(area.usuario_id) {
            return Err(ClientError::Forbidden);
        }

        ctx.client().delete_area(Some(&session), area.id).await?;
        self.areas.retain(|a| a.id != area.id);
        self.reload_after_write(ctx).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_defaults_to_active_and_drops_blanks() {
        let form = AreaForm {
            nome: "Parque Dona Lindu".into(),
            localizacao: "Boa Viagem".into(),
            descricao: " ".into(),
            ..Default::default()
        };
        let req = form.validate().unwrap();
        assert_eq!(req.status.as_deref(), Some("Ativa"));
        assert_eq!(req.descricao, None);
    }

    #[test]
    fn name_and_location_are_required() {
        let form = AreaForm {
            nome: "Sem local".into(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(ClientError::Validation(_))));
    }
}

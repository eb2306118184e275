use biourb_types::api::StatsResponse;

use crate::error::ClientError;
use crate::session::SessionContext;

/// Landing page counters. Starts empty and is filled by `load`.
#[derive(Debug, Default)]
pub struct HomeView {
    pub stats: Option<StatsResponse>,
}

impl HomeView {
    pub async fn load(&mut self, ctx: &SessionContext) -> Result<&StatsResponse, ClientError> {
        let stats = ctx.client().stats().await?;
        Ok(&*self.stats.insert(stats))
    }

    /// Share of registered trees in good health, as a whole percentage.
    pub fn healthy_share(&self) -> Option<u8> {
        let stats = self.stats.as_ref()?;
        if stats.total_arvores == 0 {
            return None;
        }
        Some((stats.arvores_saudaveis * 100 / stats.total_arvores) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_share_needs_trees() {
        let mut home = HomeView::default();
        assert_eq!(home.healthy_share(), None);

        home.stats = Some(StatsResponse {
            total_arvores: 0,
            total_areas: 1,
            total_usuarios: 1,
            arvores_saudaveis: 0,
        });
        assert_eq!(home.healthy_share(), None);

        home.stats = Some(StatsResponse {
            total_arvores: 3,
            total_areas: 1,
            total_usuarios: 1,
            arvores_saudaveis: 2,
        });
        assert_eq!(home.healthy_share(), Some(66));
    }
}

// ── Inventory facade ──
//
// The extraction entry points. Each one fetches through the session
// controller (liveness-checked, one refresh at most) and hands the page
// to the matching extractor. The controller sits behind an async mutex,
// so concurrent callers are served strictly one at a time.

use netinv_api::{Credential, DriverLauncher};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::buildings::BuildingNameMap;
use crate::config::PortalConfig;
use crate::error::CoreError;
use crate::extract::{Extraction, extract_active_macs, extract_nams, extract_vlans};
use crate::model::{MacRecord, NamRecord, VlanRecord};
use crate::session::{SessionController, SessionState};

pub struct Inventory<L: DriverLauncher> {
    session: Mutex<SessionController<L>>,
    buildings: BuildingNameMap,
}

impl<L: DriverLauncher> Inventory<L> {
    pub fn new(session: SessionController<L>, buildings: BuildingNameMap) -> Self {
        Self {
            session: Mutex::new(session),
            buildings,
        }
    }

    /// Authenticate a fresh session and wrap it.
    pub async fn connect(
        launcher: L,
        config: PortalConfig,
        credential: Credential,
        buildings: BuildingNameMap,
    ) -> Result<Self, CoreError> {
        let mut session = SessionController::new(launcher, config, credential);
        session.authenticate().await?;
        Ok(Self::new(session, buildings))
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// VLAN definitions from the summary page.
    pub async fn vlans(&self) -> Result<Extraction<VlanRecord>, CoreError> {
        let mut session = self.session.lock().await;
        let base = session.config().base_url.clone();
        let page = session.fetch_verified(&base).await?;
        let out = extract_vlans(&page);
        info!(vlans = out.records.len(), issues = out.issues.len(), "VLAN summary extracted");
        Ok(out)
    }

    /// MAC addresses seen on `vlan` (e.g. `ENG-CIVL&ENV-1`) this month.
    pub async fn active_macs(&self, vlan: &str) -> Result<Extraction<MacRecord>, CoreError> {
        let mut session = self.session.lock().await;
        let url = maclist_url(&session.config().base_url, vlan);
        let page = session.fetch_verified(&url).await?;
        let out = extract_active_macs(&page, &self.buildings);
        info!(vlan, macs = out.records.len(), issues = out.issues.len(), "active MACs extracted");
        Ok(out)
    }

    /// Network access modules on the span of `vlan`.
    pub async fn nams(&self, vlan: &str) -> Result<Extraction<NamRecord>, CoreError> {
        let mut session = self.session.lock().await;
        let url = span_url(&session.config().base_url, vlan);
        let page = session.fetch_verified(&url).await?;
        let out = extract_nams(&page, &self.buildings);
        info!(vlan, nams = out.records.len(), issues = out.issues.len(), "NAM span extracted");
        Ok(out)
    }

    /// Release the browser session.
    pub async fn close(&self) -> Result<(), CoreError> {
        self.session.lock().await.close().await
    }
}

/// `<base>?maclist=<vlan>&period=Month`
pub fn maclist_url(base: &Url, vlan: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("maclist", vlan)
        .append_pair("period", "Month");
    debug!(%url, "maclist url");
    url
}

/// `<base>?span=<vlan>`
pub fn span_url(base: &Url, vlan: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("span", vlan);
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://portal.example.edu/cgi-bin/netadmin.pl").unwrap()
    }

    #[test]
    fn vlan_names_are_form_encoded() {
        assert_eq!(
            maclist_url(&base(), "ENG-CIVL&ENV-1").as_str(),
            "https://portal.example.edu/cgi-bin/netadmin.pl?maclist=ENG-CIVL%26ENV-1&period=Month"
        );
        assert_eq!(
            span_url(&base(), "ENG-CIVL&ENV-1").as_str(),
            "https://portal.example.edu/cgi-bin/netadmin.pl?span=ENG-CIVL%26ENV-1"
        );
    }
}

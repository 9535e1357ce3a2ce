//! System detail panel.
//!
//! Selecting a system starts an on-demand fetch of its points of interest.
//! The panel groups POIs into active and inactive sections and lets each POI
//! expand to show its player roster.

use std::{cmp::Ordering, collections::HashSet};

use nebula_proto::map::{MapPoi, SystemDetail};

/// Progress of an on-demand fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Request in flight.
    Loading,
    /// Data arrived.
    Loaded(T),
    /// Request failed; the view offers a retry.
    Failed(String),
}

/// One rendered row of the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelRow<'a> {
    /// Section heading with its POI count.
    Heading {
        /// Heading text.
        title: &'static str,
        /// POIs in the section.
        count: usize,
    },
    /// A POI line.
    Poi {
        /// The POI.
        poi: &'a MapPoi,
        /// Roster is expanded.
        expanded: bool,
    },
    /// A player under an expanded POI.
    Player {
        /// Player name.
        username: &'a str,
        /// Clan tag, if any.
        clan_tag: Option<&'a str>,
    },
    /// Nothing to show yet.
    Loading,
    /// Fetch failed; suggest a retry.
    Failed {
        /// Failure description.
        reason: &'a str,
    },
    /// System has no POIs.
    Empty,
}

/// Detail panel for the selected system.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiPanel {
    system_id: String,
    detail: FetchState<SystemDetail>,
    expanded: HashSet<String>,
}

/// Active POIs first by online count, then POIs with a base, then by name.
fn poi_order(a: &MapPoi, b: &MapPoi) -> Ordering {
    b.online
        .cmp(&a.online)
        .then_with(|| b.base.is_some().cmp(&a.base.is_some()))
        .then_with(|| a.name.cmp(&b.name))
}

impl PoiPanel {
    /// Panel for a system whose detail is being fetched.
    pub fn loading(system_id: impl Into<String>) -> Self {
        Self { system_id: system_id.into(), detail: FetchState::Loading, expanded: HashSet::new() }
    }

    /// Selected system id.
    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    /// Fetch state.
    pub fn detail(&self) -> &FetchState<SystemDetail> {
        &self.detail
    }

    /// Record a fetch result. Results for another system are ignored.
    pub fn resolve(&mut self, system_id: &str, result: Result<SystemDetail, String>) {
        if system_id != self.system_id {
            tracing::debug!(system_id, selected = %self.system_id, "ignoring stale system detail");
            return;
        }
        self.detail = match result {
            Ok(detail) => FetchState::Loaded(detail),
            Err(reason) => {
                tracing::warn!(system_id, reason, "system detail fetch failed");
                FetchState::Failed(reason)
            },
        };
    }

    /// Mark the panel as loading again before a retry.
    pub fn retry(&mut self) {
        self.detail = FetchState::Loading;
    }

    /// Expand or collapse a POI roster.
    pub fn toggle(&mut self, poi_id: &str) {
        if !self.expanded.remove(poi_id) {
            self.expanded.insert(poi_id.to_string());
        }
    }

    /// Whether a POI roster is expanded.
    pub fn is_expanded(&self, poi_id: &str) -> bool {
        self.expanded.contains(poi_id)
    }

    /// Active (online > 0) and inactive POIs, each sorted.
    pub fn sections(&self) -> (Vec<&MapPoi>, Vec<&MapPoi>) {
        let FetchState::Loaded(detail) = &self.detail else {
            return (vec![], vec![]);
        };
        let (mut active, mut inactive): (Vec<&MapPoi>, Vec<&MapPoi>) =
            detail.pois.iter().partition(|poi| poi.online > 0);
        active.sort_by(|a, b| poi_order(a, b));
        inactive.sort_by(|a, b| poi_order(a, b));
        (active, inactive)
    }

    /// Flattened rows for display.
    pub fn rows(&self) -> Vec<PanelRow<'_>> {
        match &self.detail {
            FetchState::Loading => return vec![PanelRow::Loading],
            FetchState::Failed(reason) => return vec![PanelRow::Failed { reason }],
            FetchState::Loaded(detail) if detail.pois.is_empty() => return vec![PanelRow::Empty],
            FetchState::Loaded(_) => {},
        }

        let (active, inactive) = self.sections();
        let mut rows = Vec::new();
        for (title, pois) in [("Active", active), ("Quiet", inactive)] {
            if pois.is_empty() {
                continue;
            }
            rows.push(PanelRow::Heading { title, count: pois.len() });
            for poi in pois {
                let expanded = self.is_expanded(&poi.id);
                rows.push(PanelRow::Poi { poi, expanded });
                if expanded {
                    rows.extend(poi.players.iter().map(|p| PanelRow::Player {
                        username: &p.username,
                        clan_tag: p.clan_tag.as_deref(),
                    }));
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use nebula_proto::map::{BaseRef, PoiPlayer};

    use super::*;

    fn poi(id: &str, online: u32, base: bool) -> MapPoi {
        MapPoi {
            id: id.into(),
            name: id.into(),
            online,
            base: base.then(|| BaseRef { id: format!("{id}_base"), name: "Base".into() }),
            players: (0..online)
                .map(|i| PoiPlayer { username: format!("{id}_p{i}"), ..PoiPlayer::default() })
                .collect(),
            ..MapPoi::default()
        }
    }

    fn loaded(pois: Vec<MapPoi>) -> PoiPanel {
        let mut panel = PoiPanel::loading("sol");
        panel.resolve("sol", Ok(SystemDetail { id: "sol".into(), name: "Sol".into(), pois }));
        panel
    }

    #[test]
    fn sections_are_grouped_and_sorted() {
        let panel = loaded(vec![
            poi("belt", 1, false),
            poi("moon", 0, false),
            poi("hub", 3, true),
            poi("dock", 1, true),
            poi("anchorage", 0, true),
        ]);

        let (active, inactive) = panel.sections();
        let active: Vec<_> = active.iter().map(|p| p.id.as_str()).collect();
        let inactive: Vec<_> = inactive.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(active, vec!["hub", "dock", "belt"]);
        assert_eq!(inactive, vec!["anchorage", "moon"]);
    }

    #[test]
    fn expanding_reveals_roster() {
        let mut panel = loaded(vec![poi("hub", 2, true)]);
        assert_eq!(panel.rows().len(), 2);

        panel.toggle("hub");
        let rows = panel.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], PanelRow::Player { username: "hub_p0", clan_tag: None });

        panel.toggle("hub");
        assert_eq!(panel.rows().len(), 2);
    }

    #[test]
    fn failure_renders_retry_state() {
        let mut panel = PoiPanel::loading("sol");
        panel.resolve("sol", Err("timeout".into()));
        assert_eq!(panel.rows(), vec![PanelRow::Failed { reason: "timeout" }]);

        panel.retry();
        assert_eq!(panel.rows(), vec![PanelRow::Loading]);
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut panel = PoiPanel::loading("sol");
        panel.resolve("vega", Err("timeout".into()));
        assert_eq!(panel.detail(), &FetchState::Loading);
    }

    #[test]
    fn empty_system_has_placeholder() {
        assert_eq!(loaded(vec![]).rows(), vec![PanelRow::Empty]);
    }
}

//! Clear-menu policy: which clear actions make sense for what is drawn.

use serde::{Deserialize, Serialize};

use crate::models::OverlayPresence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearAction {
    /// Remove only the route-step markers.
    ClearRouteNodesOnly,
    /// Remove only the route path geometry.
    ClearRouteOnly,
    /// Remove step markers, path and the destination waypoint.
    ClearAll,
    NothingToClear,
}

impl ClearAction {
    pub fn label(&self) -> &'static str {
        match self {
            ClearAction::ClearRouteNodesOnly => "Clear Route Node Only",
            ClearAction::ClearRouteOnly => "Clear Route Only",
            ClearAction::ClearAll => "Clear All",
            ClearAction::NothingToClear => "Nothing to Clear",
        }
    }
}

/// Menu entries for the current overlay state, in display order.
pub fn compute_clear_options(presence: &OverlayPresence) -> Vec<ClearAction> {
    use ClearAction::*;

    let path = presence.route_path_present;
    let nodes = presence.route_step_marker_count > 0;
    let destination = presence.destination_marker_present;

    match (path, nodes, destination) {
        (false, true, _) => vec![ClearRouteNodesOnly, ClearAll],
        (false, false, false) => vec![NothingToClear],
        (false, false, true) => vec![ClearAll],
        (true, false, _) => vec![ClearRouteOnly, ClearAll],
        (true, true, _) => vec![ClearRouteNodesOnly, ClearRouteOnly, ClearAll],
    }
}

#[cfg(test)]
mod tests {
    use super::ClearAction::*;
    use super::*;

    fn presence(path: bool, nodes: usize, destination: bool) -> OverlayPresence {
        OverlayPresence {
            route_path_present: path,
            route_step_marker_count: nodes,
            destination_marker_present: destination,
        }
    }

    #[test]
    fn nodes_without_path() {
        for destination in [false, true] {
            assert_eq!(
                compute_clear_options(&presence(false, 3, destination)),
                vec![ClearRouteNodesOnly, ClearAll]
            );
        }
    }

    #[test]
    fn nothing_drawn() {
        assert_eq!(compute_clear_options(&presence(false, 0, false)), vec![NothingToClear]);
    }

    #[test]
    fn only_destination_drawn() {
        assert_eq!(compute_clear_options(&presence(false, 0, true)), vec![ClearAll]);
    }

    #[test]
    fn path_without_nodes() {
        for destination in [false, true] {
            assert_eq!(
                compute_clear_options(&presence(true, 0, destination)),
                vec![ClearRouteOnly, ClearAll]
            );
        }
    }

    #[test]
    fn path_and_nodes() {
        for destination in [false, true] {
            assert_eq!(
                compute_clear_options(&presence(true, 1, destination)),
                vec![ClearRouteNodesOnly, ClearRouteOnly, ClearAll]
            );
        }
    }

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&ClearRouteNodesOnly).unwrap(),
            "\"clear_route_nodes_only\""
        );
        let action: ClearAction = serde_json::from_str("\"clear_all\"").unwrap();
        assert_eq!(action, ClearAll);
        assert_eq!(NothingToClear.label(), "Nothing to Clear");
    }
}
